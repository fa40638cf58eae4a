pub mod templates;

use itertools::Itertools;
use log::{error, info};
use std::{fs, path::PathBuf};

use crate::TaskParams;
use templates::OUTPUT_TABLE_NAME;

/// Placeholder tokens in the order they are substituted.
pub const PLACEHOLDERS: [&str; 11] = [
    "%OUTPUT%",
    "%V%",
    "%SOURCE%",
    "%DESTINATION%",
    "%0%",
    "%TABLE%",
    "%SOLUTION.V%",
    "%V<V%",
    "%LOOP%",
    "%DEPTH%",
    "%K%",
];

/// Expands SQL templates for one set of task parameters.
pub struct QueryBuilder {
    params: TaskParams,
    save_path: Option<PathBuf>,
    query: String,
}

impl QueryBuilder {
    pub fn new(params: TaskParams) -> Self {
        Self {
            params,
            save_path: None,
            query: String::new(),
        }
    }

    /// Writes every built query to `path`, overwriting the file.
    pub fn save_to(mut self, path: impl Into<PathBuf>) -> Self {
        self.save_path = Some(path.into());
        self
    }

    /// Builds the query of the configured task.
    pub fn build_task(&mut self) -> String {
        let template = self.params.task.template();
        self.build(template)
    }

    /// Replaces every placeholder in `template` with its value.
    pub fn build(&mut self, template: &str) -> String {
        let variable_map = self.map_variables();
        debug_assert!(
            variable_map
                .iter()
                .all(|(_, value)| PLACEHOLDERS.iter().all(|p| !value.contains(p))),
            "placeholder values must not contain placeholders"
        );

        let mut query = template.to_string();
        for (key, value) in variable_map.iter() {
            query = query.replace(key, value);
        }
        self.query = query;
        info!(
            "Built {} query for k={} over {}",
            self.params.task, self.params.k, self.params.table
        );

        if self.save_path.is_some() {
            self.save();
        }

        self.query.clone()
    }

    /// Values of all placeholders, in substitution order.
    pub fn map_variables(&self) -> Vec<(&'static str, String)> {
        let k = self.params.k;
        vec![
            ("%OUTPUT%", OUTPUT_TABLE_NAME.to_string()),
            ("%V%", columns(k)),
            ("%SOURCE%", self.params.source.clone()),
            ("%DESTINATION%", self.params.destination.clone()),
            ("%0%", "a - a, ".repeat(k.saturating_sub(2))),
            ("%TABLE%", self.params.table.clone()),
            ("%SOLUTION.V%", carried_columns(k)),
            ("%V<V%", increasing_chain(k)),
            ("%LOOP%", adjacency_loop(k)),
            ("%DEPTH%", k.saturating_sub(1).to_string()),
            ("%K%", k.to_string()),
        ]
    }

    pub fn get_text(&self) -> &str {
        &self.query
    }

    pub fn get_params(&self) -> &TaskParams {
        &self.params
    }

    fn save(&self) {
        if let Some(path) = &self.save_path {
            match fs::write(path, &self.query) {
                Ok(()) => info!("Saved query to {}", path.display()),
                Err(e) => error!("Could not save query: {}", e),
            }
        }
    }
}

/// `v1, v2, ..., vk`
fn columns(k: usize) -> String {
    (1..=k).map(|i| format!("v{}", i)).join(", ")
}

/// `solution.v2, ..., solution.vk`, the slots that survive a shift.
fn carried_columns(k: usize) -> String {
    (2..=k).map(|i| format!("solution.v{}", i)).join(", ")
}

/// `v1 < v2 AND v2 < v3 AND ... AND v(k-1) < vk`
fn increasing_chain(k: usize) -> String {
    (1..k).map(|i| format!("v{} < v{}", i, i + 1)).join(" AND ")
}

/// The joined vertex `edge.b` must be adjacent to every chosen vertex.
///
/// Slot `vi` only holds a vertex once `d >= k - i`, before that it is a pad.
/// `v(k-1)` is live from the first row on.
fn adjacency_loop(k: usize) -> String {
    (1..k)
        .map(|i| {
            let adjacent = format!(
                "EXISTS (SELECT 1 FROM edge adj WHERE adj.a = solution.v{} AND adj.b = edge.b)",
                i
            );
            if i + 1 == k {
                adjacent
            } else {
                format!("(solution.d < {} OR {})", k - i, adjacent)
            }
        })
        .join("\n      AND ")
}
