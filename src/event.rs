//! Runtime event instances.
//!
//! An [`EventInstance`] is created empty from an [`EventSchema`] and mutated
//! only through [`EventInstance::update`], which overwrites every field at
//! once. Derived counters are recomputed on each update.

use crate::error::{Error, Result};
use crate::schema::{EventSchema, order_keys};
use std::collections::HashMap;
use std::fmt;

/// One (candidate) event extracted from a document.
#[derive(Debug, Clone, PartialEq)]
pub struct EventInstance {
    name: String,
    fields: Vec<String>,
    field2content: HashMap<String, Option<String>>,
    key_fields: Vec<String>,
    recguid: Option<String>,
    nonempty_count: usize,
    nonempty_ratio: f64,
}

impl EventInstance {
    /// Create an empty instance of `schema`.
    ///
    /// Fails with [`Error::DegenerateSchema`] when the schema has no fields.
    pub fn new(schema: &EventSchema) -> Result<Self> {
        if schema.fields().is_empty() {
            return Err(Error::DegenerateSchema { schema: schema.name().to_string() });
        }

        let fields = schema.fields().to_vec();
        let field2content = fields.iter().map(|f| (f.clone(), None)).collect();

        Ok(EventInstance {
            name: schema.name().to_string(),
            fields,
            field2content,
            key_fields: schema.key_fields().to_vec(),
            recguid: None,
            nonempty_count: 0,
            nonempty_ratio: 0.0,
        })
    }

    /// Replace the whole field state and the `recguid`.
    ///
    /// Fields missing from `field2text` (or mapped to `None`) become empty;
    /// keys that are not schema fields are ignored.
    pub fn update(&mut self, field2text: &HashMap<String, Option<String>>, recguid: Option<String>) {
        self.recguid = recguid;
        self.nonempty_count = 0;

        for field in &self.fields {
            let value = field2text.get(field).cloned().flatten();
            if value.is_some() {
                self.nonempty_count += 1;
            }
            self.field2content.insert(field.clone(), value);
        }

        self.nonempty_ratio = self.nonempty_count as f64 / self.fields.len() as f64;
    }

    /// Replace the key fields of this instance only (the schema is untouched).
    pub fn set_key_fields<I, S>(&mut self, key_fields: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.key_fields = order_keys(&self.name, &self.fields, key_fields)?;
        Ok(())
    }

    /// True iff every key field is populated (vacuously true without keys).
    pub fn is_key_complete(&self) -> bool {
        self.key_fields.iter().all(|k| self.is_populated(k))
    }

    /// Key-complete and at least `min_match_count` populated fields.
    pub fn is_good_candidate(&self, min_match_count: usize) -> bool {
        self.is_key_complete() && self.nonempty_count >= min_match_count
    }

    /// Snapshot of all field values.
    pub fn field_values(&self) -> HashMap<String, Option<String>> {
        self.field2content.clone()
    }

    /// Field values in schema field order.
    pub fn as_tuple(&self) -> Vec<Option<String>> {
        self.fields.iter().map(|f| self.get(f).map(str::to_string)).collect()
    }

    /// Value of `field`, if the field exists and is populated.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.field2content.get(field).and_then(|v| v.as_deref())
    }

    fn is_populated(&self, field: &str) -> bool {
        self.get(field).is_some()
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn fields(&self) -> &[String] {
        &self.fields
    }

    pub fn key_fields(&self) -> &[String] {
        &self.key_fields
    }

    pub fn recguid(&self) -> Option<&str> {
        self.recguid.as_deref()
    }

    pub fn nonempty_count(&self) -> usize {
        self.nonempty_count
    }

    pub fn nonempty_ratio(&self) -> f64 {
        self.nonempty_ratio
    }
}

impl fmt::Display for EventInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\n{}[", self.name)?;
        writeln!(f, "  recguid={}", self.recguid.as_deref().unwrap_or("None"))?;
        writeln!(f, "  nonempty_count={}", self.nonempty_count)?;
        writeln!(f, "  nonempty_ratio={:.3}", self.nonempty_ratio)?;
        writeln!(f, "] (")?;
        for field in &self.fields {
            let marker = if self.key_fields.contains(field) { " (key)" } else { "" };
            writeln!(f, "  {}={}, {}", field, self.get(field).unwrap_or("None"), marker)?;
        }
        writeln!(f, ")")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::EventSchema;

    fn pledge_schema() -> EventSchema {
        let fields = ["质押金额", "质押开始日期", "接收方", "质押方", "质押结束日期"];
        let fields = fields.iter().map(|s| s.to_string()).collect();
        EventSchema::new("股权质押", "EquityPledge", fields, ["质押金额", "质押方"]).unwrap()
    }

    fn values(pairs: &[(&str, Option<&str>)]) -> HashMap<String, Option<String>> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.map(str::to_string))).collect()
    }

    #[test]
    fn new_instance_is_empty() {
        let ev = EventInstance::new(&pledge_schema()).unwrap();
        assert_eq!(ev.nonempty_count(), 0);
        assert_eq!(ev.nonempty_ratio(), 0.0);
        assert_eq!(ev.recguid(), None);
        assert!(ev.as_tuple().iter().all(Option::is_none));
        assert_eq!(ev.key_fields(), &["质押金额".to_string(), "质押方".to_string()][..]);
    }

    #[test]
    fn update_counts_and_ratio() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.update(&values(&[("质押金额", Some("1000万股")), ("接收方", Some("")), ("质押方", None)]), Some("g1".into()));

        // Empty strings are still populated values.
        assert_eq!(ev.nonempty_count(), 2);
        assert!((ev.nonempty_ratio() - 0.4).abs() < 1e-9);
        assert_eq!(ev.recguid(), Some("g1"));
    }

    #[test]
    fn update_is_full_overwrite() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.update(&values(&[("质押金额", Some("a")), ("质押方", Some("b"))]), Some("g1".into()));
        ev.update(&values(&[("接收方", Some("c"))]), None);

        assert_eq!(ev.get("质押金额"), None);
        assert_eq!(ev.get("接收方"), Some("c"));
        assert_eq!(ev.nonempty_count(), 1);
        assert_eq!(ev.recguid(), None);
    }

    #[test]
    fn unknown_input_fields_are_ignored() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.update(&values(&[("not-a-field", Some("x"))]), None);
        assert_eq!(ev.nonempty_count(), 0);
        assert!(!ev.field_values().contains_key("not-a-field"));
    }

    #[test]
    fn key_completeness_and_candidates() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.update(&values(&[("质押金额", Some("a"))]), None);
        assert!(!ev.is_key_complete());
        assert!(!ev.is_good_candidate(1));

        ev.update(&values(&[("质押金额", Some("a")), ("质押方", Some("b"))]), None);
        assert!(ev.is_key_complete());
        assert!(ev.is_good_candidate(2));
        assert!(!ev.is_good_candidate(3));
        assert!(!ev.is_good_candidate(ev.fields().len() + 1));
    }

    #[test]
    fn empty_key_set_is_vacuously_complete() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.set_key_fields(Vec::<String>::new()).unwrap();
        assert!(ev.is_key_complete());
        assert!(ev.is_good_candidate(0));
        assert!(!ev.is_good_candidate(1));
    }

    #[test]
    fn set_key_fields_validates_membership() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        assert!(ev.set_key_fields(["接收方"]).is_ok());
        assert_eq!(ev.key_fields(), &["接收方".to_string()][..]);
        assert!(matches!(ev.set_key_fields(["unknown"]), Err(Error::UnknownKeyField { .. })));
        assert_eq!(ev.key_fields(), &["接收方".to_string()][..]);
    }

    #[test]
    fn field_values_is_a_snapshot() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.update(&values(&[("质押金额", Some("a"))]), None);
        let mut snapshot = ev.field_values();
        snapshot.insert("质押金额".into(), None);
        assert_eq!(ev.get("质押金额"), Some("a"));
    }

    #[test]
    fn as_tuple_follows_schema_order() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.update(&values(&[("质押结束日期", Some("end")), ("质押金额", Some("amt"))]), None);
        assert_eq!(ev.as_tuple(), vec![Some("amt".to_string()), None, None, None, Some("end".to_string())]);
    }

    #[test]
    fn display_marks_key_fields_in_order() {
        let mut ev = EventInstance::new(&pledge_schema()).unwrap();
        ev.update(&values(&[("质押金额", Some("amt"))]), Some("r1".into()));
        let text = ev.to_string();

        assert!(text.starts_with("\n股权质押[\n"));
        assert!(text.contains("  recguid=r1\n"));
        assert!(text.contains("  nonempty_ratio=0.200\n"));
        assert!(text.contains("  质押金额=amt,  (key)\n"));
        assert!(text.contains("  接收方=None, \n"));
        assert!(text.ends_with(", \n)\n"));
        let amount = text.find("质押金额=").unwrap();
        let end = text.find("质押结束日期=").unwrap();
        assert!(amount < end);
    }
}
