//! Navigation and view switching utilities.

use registrar_core::catalog::{INDIVIDUALS, NOMENCLATURE, STAFFERS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum View {
    Nomenclature,
    Individuals,
    Staffers,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            View::Nomenclature => "Nomenclature",
            View::Individuals => "Individuals",
            View::Staffers => "Staffers",
        }
    }

    /// Route name resolved through the page registry.
    pub fn route(&self) -> &'static str {
        match self {
            View::Nomenclature => NOMENCLATURE,
            View::Individuals => INDIVIDUALS,
            View::Staffers => STAFFERS,
        }
    }

    pub fn all() -> &'static [View] {
        &[View::Nomenclature, View::Individuals, View::Staffers]
    }

    pub fn index(&self) -> usize {
        Self::all().iter().position(|v| v == self).unwrap_or(0)
    }

    pub fn from_index(index: usize) -> Option<View> {
        Self::all().get(index).copied()
    }

    pub fn next(&self) -> View {
        let all = Self::all();
        all[(self.index() + 1) % all.len()]
    }

    pub fn previous(&self) -> View {
        let all = Self::all();
        let idx = self.index();
        let prev = if idx == 0 { all.len() - 1 } else { idx - 1 };
        all[prev]
    }
}
