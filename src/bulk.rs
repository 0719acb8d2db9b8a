use serde::Serialize;
use strum::{AsRefStr, Display, EnumIter, EnumString};

#[derive(
    AsRefStr, EnumIter, EnumString, Serialize, Debug, Display, PartialEq, Eq, Copy, Clone,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum BulkAction {
    Delete,
    Activate,
    Deactivate,
    Export,
}

impl BulkAction {
    pub fn verb(&self) -> &'static str {
        match self {
            BulkAction::Delete => "delete",
            BulkAction::Activate => "activate",
            BulkAction::Deactivate => "deactivate",
            BulkAction::Export => "export",
        }
    }

    pub fn confirm_text(&self, count: usize) -> String {
        format!("Are you sure you want to {} {} items?", self.verb(), count)
    }
}

/// Why a bulk request never left the client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkRejection {
    NoItems,
    NoAction,
}

impl BulkRejection {
    pub fn message(&self) -> &'static str {
        match self {
            BulkRejection::NoItems => "Please select at least one item.",
            BulkRejection::NoAction => "Please select an action.",
        }
    }
}

/// A validated request ready to be confirmed and sent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BulkRequest {
    pub action: BulkAction,
    pub items: Vec<String>,
}

/// State of the "apply" button under a listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApplyButton {
    pub enabled: bool,
    pub label: String,
}

#[derive(Debug, Clone)]
struct Row {
    id: String,
    checked: bool,
}

/// Checkbox selection over the rows of one listing page, in display order.
#[derive(Debug, Clone, Default)]
pub struct BulkSelection {
    rows: Vec<Row>,
}

impl BulkSelection {
    pub fn new<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            rows: ids
                .into_iter()
                .map(|id| Row {
                    id: id.into(),
                    checked: false,
                })
                .collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// The "select all" checkbox drives every row.
    pub fn set_all(&mut self, checked: bool) {
        for row in &mut self.rows {
            row.checked = checked;
        }
    }

    /// Returns false if no row has that id.
    pub fn set_checked(&mut self, id: &str, checked: bool) -> bool {
        match self.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.checked = checked;
                true
            }
            None => false,
        }
    }

    pub fn toggle(&mut self, id: &str) -> bool {
        match self.rows.iter_mut().find(|row| row.id == id) {
            Some(row) => {
                row.checked = !row.checked;
                true
            }
            None => false,
        }
    }

    pub fn selected(&self) -> Vec<String> {
        self.rows
            .iter()
            .filter(|row| row.checked)
            .map(|row| row.id.clone())
            .collect()
    }

    pub fn selected_count(&self) -> usize {
        self.rows.iter().filter(|row| row.checked).count()
    }

    pub fn apply_button(&self) -> ApplyButton {
        let count = self.selected_count();
        ApplyButton {
            enabled: count > 0,
            label: if count > 0 {
                format!("Apply ({})", count)
            } else {
                "Apply".to_string()
            },
        }
    }

    /// Items are checked before the action so an empty selection is always
    /// reported as such.
    pub fn prepare(&self, action: Option<BulkAction>) -> Result<BulkRequest, BulkRejection> {
        let items = self.selected();
        if items.is_empty() {
            return Err(BulkRejection::NoItems);
        }
        let action = action.ok_or(BulkRejection::NoAction)?;
        Ok(BulkRequest { action, items })
    }
}
