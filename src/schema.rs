//! Classifies score columns into standalone benchmarks and prefix groups.

use serde::Serialize;

/// Columns that carry model identity or cost rather than a score.
pub const RESERVED_COLUMNS: &[&str] = &["name", "provider", "cost_usd", "cost_rmb"];

/// A benchmark composed of subset columns sharing the `<group>_` prefix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BenchmarkGroup {
    pub name: String,
    pub members: Vec<String>,
}

/// Ordered benchmark list plus group membership for one dataset.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BenchmarkSchema {
    pub benchmarks: Vec<String>,
    pub groups: Vec<BenchmarkGroup>,
}

impl BenchmarkSchema {
    /// Resolves the schema from a header row.
    ///
    /// When a standalone column shares its name with a group prefix
    /// (`X` alongside `X_y`), the group wins: `X` is scored as the mean of
    /// its members and the raw `X` column is not read.
    pub fn resolve<S: AsRef<str>>(headers: &[S]) -> Self {
        let mut schema = Self::default();

        for header in headers.iter().map(AsRef::as_ref) {
            if header.is_empty() || RESERVED_COLUMNS.contains(&header) {
                continue;
            }

            match group_prefix(header) {
                Some(prefix) => match schema.groups.iter_mut().find(|g| g.name == prefix) {
                    Some(group) => {
                        if !group.members.iter().any(|m| m == header) {
                            group.members.push(header.to_owned());
                        }
                    }
                    None => {
                        if schema.benchmarks.iter().any(|b| b == prefix) {
                            tracing::warn!(
                                "column `{header}` groups under existing benchmark `{prefix}`; the raw `{prefix}` column is ignored"
                            );
                        }
                        schema.push_benchmark(prefix);
                        schema.groups.push(BenchmarkGroup {
                            name: prefix.to_owned(),
                            members: vec![header.to_owned()],
                        });
                    }
                },
                None => {
                    if schema.group(header).is_some() {
                        tracing::warn!(
                            "standalone column `{header}` collides with a benchmark group and is ignored"
                        );
                    }
                    schema.push_benchmark(header);
                }
            }
        }

        schema
    }

    fn push_benchmark(&mut self, name: &str) {
        if !self.benchmarks.iter().any(|b| b == name) {
            self.benchmarks.push(name.to_owned());
        }
    }

    /// Group named `key`, if `key` is a group rather than a standalone column.
    pub fn group(&self, key: &str) -> Option<&BenchmarkGroup> {
        self.groups.iter().find(|group| group.name == key)
    }

    /// Every score column that holds a raw value (standalone benchmarks and
    /// group members), in header order.
    pub fn score_columns(&self) -> Vec<&str> {
        let mut columns = Vec::new();
        for benchmark in &self.benchmarks {
            match self.group(benchmark) {
                Some(group) => columns.extend(group.members.iter().map(String::as_str)),
                None => columns.push(benchmark.as_str()),
            }
        }
        columns
    }

    pub fn contains(&self, key: &str) -> bool {
        self.benchmarks.iter().any(|b| b == key)
            || self.groups.iter().any(|g| g.members.iter().any(|m| m == key))
    }
}

fn group_prefix(header: &str) -> Option<&str> {
    header
        .split_once('_')
        .map(|(prefix, _)| prefix)
        .filter(|prefix| !prefix.is_empty())
}
