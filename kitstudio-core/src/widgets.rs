//! Central widget event dispatcher.
//!
//! Interactive elements declare what they do with `data-action`. An event names its
//! target by id; the dispatcher looks up the action, lets the owning widget kind
//! compute patches against the page, then applies them.

use std::collections::HashMap;

use crate::error::{StudioError, StudioResult};
use crate::page::{NodePath, Page, PageElement};

pub const ATTR_ACTION: &str = "data-action";
pub const ATTR_WIDGET: &str = "data-widget";

const OPEN: &str = "is-open";
const ACTIVE: &str = "is-active";

/// Action name → widget kind for every built-in action.
const BUILTIN_ACTIONS: &[(&str, WidgetKind)] = &[
    ("accordion-toggle", WidgetKind::Accordion),
    ("modal-open", WidgetKind::Modal),
    ("modal-close", WidgetKind::Modal),
    ("slider-input", WidgetKind::Slider),
    ("tab-select", WidgetKind::Tabs),
    ("checkbox-all", WidgetKind::CheckboxGroup),
    ("checkbox-item", WidgetKind::CheckboxGroup),
];

#[derive(Debug, Clone, PartialEq)]
pub enum EventKind {
    Click,
    Change {
        value: Option<String>,
        checked: Option<bool>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetEvent {
    pub target_id: String,
    pub kind: EventKind,
}

impl WidgetEvent {
    pub fn click(target_id: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            kind: EventKind::Click,
        }
    }

    pub fn input(target_id: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            target_id: target_id.into(),
            kind: EventKind::Change {
                value: Some(value.into()),
                checked: None,
            },
        }
    }

    pub fn toggle(target_id: impl Into<String>, checked: bool) -> Self {
        Self {
            target_id: target_id.into(),
            kind: EventKind::Change {
                value: None,
                checked: Some(checked),
            },
        }
    }

    fn value(&self) -> Option<&str> {
        match &self.kind {
            EventKind::Change { value, .. } => value.as_deref(),
            EventKind::Click => None,
        }
    }

    fn checked(&self) -> Option<bool> {
        match &self.kind {
            EventKind::Change { checked, .. } => *checked,
            EventKind::Click => None,
        }
    }
}

/// One mutation of one element.
#[derive(Debug, Clone, PartialEq)]
pub enum Change {
    AddClass(String),
    RemoveClass(String),
    SetAttribute { name: String, value: String },
    RemoveAttribute(String),
    SetText(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub path: NodePath,
    pub change: Change,
}

impl Patch {
    fn add_class(path: &[usize], class: &str) -> Self {
        Self {
            path: path.to_vec(),
            change: Change::AddClass(class.to_string()),
        }
    }

    fn remove_class(path: &[usize], class: &str) -> Self {
        Self {
            path: path.to_vec(),
            change: Change::RemoveClass(class.to_string()),
        }
    }

    fn set_attr(path: &[usize], name: &str, value: &str) -> Self {
        Self {
            path: path.to_vec(),
            change: Change::SetAttribute {
                name: name.to_string(),
                value: value.to_string(),
            },
        }
    }

    fn remove_attr(path: &[usize], name: &str) -> Self {
        Self {
            path: path.to_vec(),
            change: Change::RemoveAttribute(name.to_string()),
        }
    }

    fn set_text(path: &[usize], text: &str) -> Self {
        Self {
            path: path.to_vec(),
            change: Change::SetText(text.to_string()),
        }
    }

    /// `checked` present or absent.
    fn checked(path: &[usize], checked: bool) -> Self {
        if checked {
            Self::set_attr(path, "checked", "")
        } else {
            Self::remove_attr(path, "checked")
        }
    }
}

/// Apply patches in order. Patches whose path no longer resolves are skipped.
pub fn apply_patches(page: &mut Page, patches: &[Patch]) {
    for patch in patches {
        let Some(el) = page.element_mut(&patch.path) else {
            tracing::debug!(path = ?patch.path, "patch target vanished");
            continue;
        };
        match &patch.change {
            Change::AddClass(class) => el.add_class(class),
            Change::RemoveClass(class) => el.remove_class(class),
            Change::SetAttribute { name, value } => el.set_attr(name.clone(), value.clone()),
            Change::RemoveAttribute(name) => {
                el.remove_attr(name);
            }
            Change::SetText(text) => el.set_text(text.clone()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WidgetKind {
    Accordion,
    Modal,
    Slider,
    Tabs,
    CheckboxGroup,
}

impl WidgetKind {
    /// Value of `data-widget` on the widget's root element.
    pub fn widget_name(self) -> &'static str {
        match self {
            WidgetKind::Accordion => "accordion",
            WidgetKind::Modal => "modal",
            WidgetKind::Slider => "slider",
            WidgetKind::Tabs => "tabs",
            WidgetKind::CheckboxGroup => "checkbox-group",
        }
    }

    fn handle(self, page: &Page, target: &[usize], action: &str, event: &WidgetEvent) -> Vec<Patch> {
        match self {
            WidgetKind::Accordion => accordion_toggle(page, target),
            WidgetKind::Modal if action == "modal-close" => modal_close(page, target),
            WidgetKind::Modal => modal_open(page, target),
            WidgetKind::Slider => slider_input(page, target, event),
            WidgetKind::Tabs => tab_select(page, target),
            WidgetKind::CheckboxGroup => checkbox_toggle(page, target, action, event),
        }
    }
}

/// Routes events to widget kinds by the target's `data-action`.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    actions: HashMap<String, WidgetKind>,
}

impl Default for ActionDispatcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionDispatcher {
    pub fn new() -> Self {
        let actions = BUILTIN_ACTIONS
            .iter()
            .map(|(action, kind)| (action.to_string(), *kind))
            .collect();
        Self { actions }
    }

    /// Route an extra action name to an existing widget kind.
    pub fn bind(&mut self, action: impl Into<String>, kind: WidgetKind) {
        self.actions.insert(action.into(), kind);
    }

    pub fn widget_for(&self, action: &str) -> Option<WidgetKind> {
        self.actions.get(action).copied()
    }

    /// Compute and apply the patches for `event`. Returns the applied patches.
    pub fn dispatch(&self, page: &mut Page, event: &WidgetEvent) -> StudioResult<Vec<Patch>> {
        let target = page
            .find_by_id(&event.target_id)
            .ok_or_else(|| StudioError::TargetNotFound {
                id: event.target_id.clone(),
            })?;

        let Some(action) = page
            .element(&target)
            .and_then(|el| el.attr(ATTR_ACTION))
            .map(str::to_string)
        else {
            tracing::debug!(target_id = %event.target_id, "no action on target");
            return Ok(Vec::new());
        };

        let Some(kind) = self.widget_for(&action) else {
            tracing::debug!(%action, "unbound action");
            return Ok(Vec::new());
        };

        let patches = kind.handle(page, &target, &action, event);
        apply_patches(page, &patches);
        tracing::debug!(%action, widget = kind.widget_name(), patches = patches.len(), "event dispatched");
        Ok(patches)
    }
}

fn widget_root(kind: WidgetKind) -> impl Fn(&PageElement) -> bool {
    move |el: &PageElement| el.attr(ATTR_WIDGET) == Some(kind.widget_name())
}

fn has_action(action: &'static str) -> impl Fn(&PageElement) -> bool {
    move |el: &PageElement| el.attr(ATTR_ACTION) == Some(action)
}

fn accordion_toggle(page: &Page, target: &[usize]) -> Vec<Patch> {
    let Some(item) = page.closest(target, |el| el.has_class("accordion-item")) else {
        return Vec::new();
    };
    let is_open = page.element(&item).map(|el| el.has_class(OPEN)).unwrap_or(false);

    if is_open {
        return vec![
            Patch::remove_class(&item, OPEN),
            Patch::set_attr(target, "aria-expanded", "false"),
        ];
    }

    let mut patches = Vec::new();
    let single = page
        .closest(&item, widget_root(WidgetKind::Accordion))
        .filter(|root| page.element(root).map(|el| el.has_attr("data-single")).unwrap_or(false));
    if let Some(root) = single {
        let open_siblings = page.descendants(&root, |el| el.has_class("accordion-item") && el.has_class(OPEN));
        for sibling in open_siblings.into_iter().filter(|p| *p != item) {
            patches.push(Patch::remove_class(&sibling, OPEN));
            for trigger in page.descendants(&sibling, has_action("accordion-toggle")) {
                patches.push(Patch::set_attr(&trigger, "aria-expanded", "false"));
            }
        }
    }
    patches.push(Patch::add_class(&item, OPEN));
    patches.push(Patch::set_attr(target, "aria-expanded", "true"));
    patches
}

fn modal_open(page: &Page, target: &[usize]) -> Vec<Patch> {
    let Some(trigger) = page.element(target) else {
        return Vec::new();
    };
    let Some(modal) = trigger.attr("data-target").and_then(|id| page.find_by_id(id)) else {
        return Vec::new();
    };

    let mut patches = vec![
        Patch::add_class(&modal, OPEN),
        Patch::remove_attr(&modal, "hidden"),
    ];
    if let Some(title) = trigger.attr("data-modal-title") {
        for heading in page.descendants(&modal, |el| el.has_class("modal-title")) {
            patches.push(Patch::set_text(&heading, title));
        }
    }
    patches
}

fn modal_close(page: &Page, target: &[usize]) -> Vec<Patch> {
    match page.closest(target, widget_root(WidgetKind::Modal)) {
        Some(modal) => vec![
            Patch::remove_class(&modal, OPEN),
            Patch::set_attr(&modal, "hidden", ""),
        ],
        None => Vec::new(),
    }
}

fn slider_input(page: &Page, target: &[usize], event: &WidgetEvent) -> Vec<Patch> {
    let Some(value) = event.value() else {
        return Vec::new();
    };
    let mut patches = vec![Patch::set_attr(target, "value", value)];
    let output = page
        .element(target)
        .and_then(|el| el.attr("data-output"))
        .and_then(|id| page.find_by_id(id));
    if let Some(output) = output {
        patches.push(Patch::set_text(&output, value));
    }
    patches
}

fn tab_select(page: &Page, target: &[usize]) -> Vec<Patch> {
    let Some(tabs) = page.closest(target, widget_root(WidgetKind::Tabs)) else {
        return Vec::new();
    };
    let panel_id = page.element(target).and_then(|el| el.attr("data-tab"));

    let mut patches = Vec::new();
    for button in page.descendants(&tabs, |el| el.has_class("tab-button")) {
        if button == target {
            patches.push(Patch::add_class(&button, ACTIVE));
            patches.push(Patch::set_attr(&button, "aria-selected", "true"));
        } else {
            patches.push(Patch::remove_class(&button, ACTIVE));
            patches.push(Patch::set_attr(&button, "aria-selected", "false"));
        }
    }
    for panel in page.descendants(&tabs, |el| el.has_class("tab-panel")) {
        let selected = panel_id.is_some() && page.element(&panel).and_then(PageElement::id) == panel_id;
        if selected {
            patches.push(Patch::add_class(&panel, ACTIVE));
            patches.push(Patch::remove_attr(&panel, "hidden"));
        } else {
            patches.push(Patch::remove_class(&panel, ACTIVE));
            patches.push(Patch::set_attr(&panel, "hidden", ""));
        }
    }
    patches
}

fn checkbox_toggle(page: &Page, target: &[usize], action: &str, event: &WidgetEvent) -> Vec<Patch> {
    let Some(group) = page.closest(target, widget_root(WidgetKind::CheckboxGroup)) else {
        return Vec::new();
    };
    let checked = event.checked().unwrap_or_else(|| {
        !page
            .element(target)
            .map(|el| el.has_attr("checked"))
            .unwrap_or(false)
    });
    let items = page.descendants(&group, has_action("checkbox-item"));

    let mut patches = vec![Patch::checked(target, checked)];
    if action == "checkbox-all" {
        for item in items {
            patches.push(Patch::checked(&item, checked));
        }
        return patches;
    }

    let all_checked = items.iter().all(|item| {
        if item == target {
            checked
        } else {
            page.element(item).map(|el| el.has_attr("checked")).unwrap_or(false)
        }
    });
    for select_all in page.descendants(&group, has_action("checkbox-all")) {
        patches.push(Patch::checked(&select_all, all_checked));
    }
    patches
}
