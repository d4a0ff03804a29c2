//! ---
//! rg_section: "04-persistence"
//! rg_subsection: "module"
//! rg_type: "source"
//! rg_scope: "code"
//! rg_description: "Persistence abstractions and storage bindings."
//! rg_version: "v0.0.0-prealpha"
//! rg_owner: "tbd"
//! ---
use std::collections::HashSet;
use std::fs::{self, OpenOptions};
use std::iter;
use std::path::{Path, PathBuf};

use csv::{ReaderBuilder, Trim, WriterBuilder};
use parking_lot::Mutex;
use rolegraph_model::{RuleTuple, Section};
use tracing::debug;

use crate::{Result, RuleAdapter, StoredRule};

/// Adapter storing one rule per line as `ptype, v0, v1, ...`.
///
/// Lines starting with `#` are comments and duplicate lines are loaded once.
/// Every field is kept on load, empty ones included, so a rule reads back with
/// the arity it was written with.
#[derive(Debug)]
pub struct CsvFileAdapter {
    path: PathBuf,
    lock: Mutex<()>,
}

impl CsvFileAdapter {
    /// Adapter over the file at `path`; the file is created on first write.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Location of the backing file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn read(&self) -> Result<Vec<StoredRule>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .trim(Trim::All)
            .comment(Some(b'#'))
            .from_path(&self.path)?;

        let mut seen = HashSet::new();
        let mut rules = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut fields = record.iter();
            let ptype = match fields.next() {
                Some(ptype) if !ptype.is_empty() => ptype,
                _ => continue,
            };
            let values: Vec<String> = fields.map(str::to_owned).collect();
            let stored = StoredRule::new(ptype, RuleTuple::from(values))?;
            if seen.insert(stored.clone()) {
                rules.push(stored);
            }
        }
        Ok(rules)
    }

    fn write(&self, rules: &[StoredRule]) -> Result<()> {
        self.ensure_parent()?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_path(&self.path)?;
        for stored in rules {
            writer.write_record(record(stored))?;
        }
        writer.flush()?;
        Ok(())
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        Ok(())
    }

    fn rewrite_without<F>(&self, mut matches: F) -> Result<()>
    where
        F: FnMut(&StoredRule) -> bool,
    {
        let _guard = self.lock.lock();
        let mut rules = self.read()?;
        let before = rules.len();
        rules.retain(|stored| !matches(stored));
        debug!(path = %self.path.display(), removed = before - rules.len(), "rule file rewritten");
        self.write(&rules)
    }
}

fn record(stored: &StoredRule) -> impl Iterator<Item = &str> {
    iter::once(stored.ptype.as_str()).chain(stored.rule.iter().map(String::as_str))
}

impl RuleAdapter for CsvFileAdapter {
    fn load_all(&self) -> Result<Vec<StoredRule>> {
        let _guard = self.lock.lock();
        let rules = self.read()?;
        debug!(path = %self.path.display(), rules = rules.len(), "rule file loaded");
        Ok(rules)
    }

    fn save_all(&self, rules: &[StoredRule]) -> Result<()> {
        let _guard = self.lock.lock();
        self.write(rules)
    }

    fn add_rule(&self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<()> {
        let _guard = self.lock.lock();
        self.ensure_parent()?;
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_writer(file);
        let stored = StoredRule {
            section,
            ptype: ptype.to_owned(),
            rule: rule.clone(),
        };
        writer.write_record(record(&stored))?;
        writer.flush()?;
        Ok(())
    }

    fn remove_rule(&self, section: Section, ptype: &str, rule: &RuleTuple) -> Result<()> {
        self.rewrite_without(|stored| stored.belongs_to(section, ptype) && stored.rule == *rule)
    }

    fn remove_filtered_rule(
        &self,
        section: Section,
        ptype: &str,
        field_index: usize,
        field_values: &[&str],
    ) -> Result<()> {
        self.rewrite_without(|stored| {
            stored.belongs_to(section, ptype)
                && stored.rule.matches_filter(field_index, field_values)
        })
    }
}
