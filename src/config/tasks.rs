// src/config/tasks.rs
//
// Configured predictor runs. Parameters arrive under the pipeline's names
// (`abcWindow`, `toxinThval`, ...) and leave as the form field names each site expects.

use std::fmt::Write as _;

use super::consts::LBTOPE_MIN_PROBABILITY;
use super::options::TaskEntry;
use crate::core::sanitize::squash;
use crate::error::{Error, Result};
use crate::specs::{Software, Stage};

/// Pipeline name → selection form field.
pub const SELECTION_PARAM_MAP: &[(&str, &str)] = &[
    ("abcWindow", "window"),
    ("abcThres", "Threshold"),
    ("abcFilter", "filter"),
    ("lbModel", "for"),
];

/// Pipeline name → evaluation form field.
pub const EVALUATION_PARAM_MAP: &[(&str, &str)] = &[
    ("toxinSVMMethod", "method"),
    ("toxinQMMethod", "method"),
    ("toxinEval", "eval"),
    ("toxinThval", "thval"),
    ("toxin2Method", "terminus"),
    ("toxin2Eval", "svm_th"),
    ("algMethod", "terminus"),
    ("algThres", "svm_th"),
    ("il4Method", "method"),
    ("il4Thval", "thval"),
    ("il10Method", "method"),
    ("il10Thval", "thval"),
    ("ifnMethod", "method"),
];

/// Parameters that only steer other parameters and never reach a form.
const CONTROL_PARAMS: &[&str] = &["toxinMethod", "lbLength"];

/// Sets the LBtope probability cut-off instead of a form field.
const LB_THRESHOLD: &str = "lbThres";

/// Human labels → form values, per software and wire field.
/// Labels compare case- and whitespace-insensitively.
const VALUE_MAP: &[(Software, &str, &[(&str, &str)])] = &[
    (Software::ToxinPred, "method", &[
        ("SVM (Swiss-Prot)", "1"),
        ("SVM (Swiss-Prot) + Motif", "2"),
        ("SVM (TrEMBL)", "3"),
        ("SVM (TrEMBL) + Motif", "4"),
        ("QM Monopeptide (Swiss-Prot)", "5"),
        ("Monopeptide (Swiss-Prot)", "5"),
        ("QM Monopeptide (TrEMBL)", "6"),
        ("Monopeptide (TrEMBL)", "6"),
        ("QM Dipeptide (Swiss-Prot)", "7"),
        ("Dipeptide (Swiss-Prot)", "7"),
        ("QM Dipeptide (TrEMBL)", "8"),
        ("Dipeptide (TrEMBL)", "8"),
    ]),
    (Software::IL4pred, "method", &[
        ("SVM", "0"),
        ("Merci motif", "1"),
        ("MERCI", "1"),
        ("Hybrid (SVM + motif)", "2"),
        ("Hybrid", "2"),
        ("SwissProt", "3"),
        ("Swiss-prot", "3"),
    ]),
    (Software::IL10pred, "method", &[("SVM", "0"), ("Random Forest", "1")]),
    (Software::AlgPred2, "terminus", &[("AAC based RF", "0"), ("Hybrid (RF+BLAST+MERCI)", "4")]),
    (Software::ToxinPred2, "terminus", &[("AAC based RF", "0"), ("Hybrid (RF+BLAST+MERCI)", "4")]),
    (Software::IFNepitope, "method", &[("Motif", "motif"), ("SVM", "svm"), ("Hybrid", "hybrid")]),
    (Software::LBtope, "for", &[("LBtope_Variable", "flx")]),
];

/// Look a key up in a remapping table; unmapped keys pass through.
pub fn map_param_name<'a>(map: &[(&str, &'a str)], key: &'a str) -> &'a str {
    map.iter().find(|(k, _)| *k == key).map_or(key, |(_, v)| *v)
}

pub fn param_map(stage: Stage) -> &'static [(&'static str, &'static str)] {
    match stage {
        Stage::Selection => SELECTION_PARAM_MAP,
        Stage::Evaluation => EVALUATION_PARAM_MAP,
    }
}

/// Fields whose form control offers a fixed set of choices: a label outside the
/// table is rejected instead of passed through.
const CLOSED_FIELDS: &[(Software, &str)] = &[(Software::LBtope, "for")];

/// Form value for a human label. Unknown labels pass through unchanged, except on
/// closed fields where only known labels and form values are accepted.
pub fn wire_value(software: Software, wire_name: &str, label: &str) -> Result<String> {
    let key = squash(label);
    let choices: Vec<&(&str, &str)> = VALUE_MAP
        .iter()
        .filter(|(sw, field, _)| *sw == software && *field == wire_name)
        .flat_map(|(_, _, values)| values.iter())
        .collect();

    if let Some((_, v)) = choices.iter().find(|(l, _)| squash(l) == key) {
        return Ok(v.to_string());
    }
    let closed = CLOSED_FIELDS.iter().any(|(sw, field)| *sw == software && *field == wire_name);
    if !closed || choices.iter().any(|(_, v)| *v == label.trim()) {
        return Ok(label.to_string());
    }
    let known: Vec<&str> = choices.iter().map(|(l, _)| *l).collect();
    Err(Error::Config(format!(
        "{software}: unsupported value '{label}' for '{wire_name}' (supported: {})",
        known.join(", ")
    )))
}

/// Text form of a TOML parameter value.
pub fn param_text(v: &toml::Value) -> Result<String> {
    Ok(match v {
        toml::Value::String(s) => s.clone(),
        toml::Value::Integer(i) => i.to_string(),
        toml::Value::Float(f) if f.fract() == 0.0 && f.is_finite() => format!("{f:.1}"),
        toml::Value::Float(f) => f.to_string(),
        toml::Value::Boolean(b) => s!(if *b { "on" } else { "off" }),
        other => return Err(Error::Config(format!("Unsupported parameter value: {other}"))),
    })
}

/* ---------------- Form parameters ---------------- */

/// Ordered wire-name → value pairs; names are unique.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormParams(Vec<(String, String)>);

impl FormParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        let mut p = Self::new();
        for (k, v) in pairs {
            p.set(*k, *v);
        }
        p
    }

    /// Replace in place, or append.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let (name, value) = (name.into(), value.into());
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some(slot) => slot.1 = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// `self` layered over `defaults`: defaults first, overridden per name.
    pub fn merged_over(&self, defaults: &FormParams) -> FormParams {
        let mut out = defaults.clone();
        for (k, v) in self.iter() {
            out.set(k, v);
        }
        out
    }
}

/* ---------------- Tasks ---------------- */

#[derive(Clone, Debug, PartialEq)]
pub struct Task {
    pub name: String,
    pub software: Software,
    /// Parameters as configured, before remapping.
    pub given: Vec<(String, String)>,
    /// Wire parameters: predictor defaults with the configured values on top.
    pub params: FormParams,
    /// LBtope probability cut-off.
    pub min_probability: f64,
}

impl Task {
    pub fn new(name: impl Into<String>, software: Software, given: Vec<(String, String)>) -> Result<Self> {
        let name = name.into();
        let spec = software.spec();
        let map = param_map(software.stage());
        let mut user = FormParams::new();
        let mut min_probability = LBTOPE_MIN_PROBABILITY;

        // ToxinPred carries one method label per family; `toxinMethod` picks the family.
        let skip = match given.iter().find(|(k, _)| k == "toxinMethod") {
            Some((_, fam)) if squash(fam).starts_with("quantitative") || squash(fam) == "qm" => Some("toxinSVMMethod"),
            Some(_) => Some("toxinQMMethod"),
            None => None,
        };

        for (key, value) in &given {
            if CONTROL_PARAMS.contains(&key.as_str()) || Some(key.as_str()) == skip {
                continue;
            }
            if key == LB_THRESHOLD {
                min_probability = value.trim().parse().map_err(|_| {
                    Error::Config(format!("{name}: {LB_THRESHOLD} must be a number, got '{value}'"))
                })?;
                continue;
            }
            let wire = map_param_name(map, key);
            if !spec.accepts.iter().any(|a| *a == wire) {
                return Err(Error::Config(format!("{name}: {software} has no parameter '{key}'")));
            }
            user.set(wire, wire_value(software, wire, value)?);
        }

        let params = user.merged_over(&FormParams::from_pairs(spec.defaults));
        Ok(Self { name, software, given, params, min_probability })
    }
}

/// Insertion-ordered tasks keyed by name.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TaskSet(Vec<Task>);

impl TaskSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// A task with an existing name replaces the old one in its position.
    pub fn insert(&mut self, task: Task) {
        match self.0.iter_mut().find(|t| t.name == task.name) {
            Some(slot) => {
                logd!("Task {} redefined; replacing earlier definition", task.name);
                *slot = task;
            }
            None => self.0.push(task),
        }
    }

    /// First unused `<Software>-<n>`, `n >= 1`.
    pub fn next_name(&self, software: Software) -> String {
        (1..)
            .map(|i| format!("{software}-{i}"))
            .find(|n| self.get(n).is_none())
            .unwrap_or_else(|| software.to_string())
    }

    pub fn get(&self, name: &str) -> Option<&Task> {
        self.0.iter().find(|t| t.name == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Task> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Build from run-file entries; every entry must belong to `stage`.
    pub fn from_entries(entries: &[TaskEntry], stage: Stage) -> Result<Self> {
        let mut set = Self::new();
        for e in entries {
            let software: Software = e.software.parse()?;
            if software.stage() != stage {
                return Err(Error::Validation(vec![format!(
                    "{software} is not a {} software", stage.noun()
                )]));
            }
            let mut given = Vec::with_capacity(e.params.len());
            for (k, v) in &e.params {
                given.push((k.clone(), param_text(v)?));
            }
            let name = match &e.name {
                Some(n) if !n.trim().is_empty() => n.trim().to_string(),
                _ => set.next_name(software),
            };
            set.insert(Task::new(name, software, given)?);
        }
        Ok(set)
    }

    /// Parse summary lines such as
    /// `1) "ABCpred-1": {'software': 'ABCpred', 'abcWindow': '16'}`.
    pub fn parse_summary(text: &str) -> Result<Self> {
        let mut set = Self::new();
        for (n, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let (name, mut entries) = parse_summary_line(line)
                .map_err(|e| Error::Parse(format!("summary line {}: {e}", n + 1)))?;
            let pos = entries.iter().position(|(k, _)| k == "software").ok_or_else(|| {
                Error::Parse(format!("summary line {}: no 'software' entry", n + 1))
            })?;
            let software: Software = entries.remove(pos).1.parse()?;
            set.insert(Task::new(name, software, entries)?);
        }
        Ok(set)
    }

    pub fn render_summary(&self) -> String {
        let mut out = s!();
        for (i, t) in self.0.iter().enumerate() {
            let _ = write!(out, "{}) \"{}\": {{'software': '{}'", i + 1, t.name, t.software);
            for (k, v) in &t.given {
                let _ = write!(out, ", '{k}': '{v}'");
            }
            out.push_str("}\n");
        }
        out
    }
}

impl<'a> IntoIterator for &'a TaskSet {
    type Item = &'a Task;
    type IntoIter = std::slice::Iter<'a, Task>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/* ---------------- Summary line parsing ---------------- */

type Entries = Vec<(String, String)>;

fn parse_summary_line(line: &str) -> std::result::Result<(String, Entries), String> {
    let rest = line.trim();
    let rest = match rest.find(')') {
        Some(i) if rest[..i].trim().chars().all(|c| c.is_ascii_digit()) => &rest[i + 1..],
        _ => rest,
    };
    let mut cur = Cursor(rest.trim_start());
    let name = cur.quoted()?;
    cur.expect(':')?;
    cur.expect('{')?;

    let mut entries = Vec::new();
    loop {
        cur.skip_ws();
        if cur.eat('}') {
            break;
        }
        let key = cur.quoted()?;
        cur.expect(':')?;
        let value = cur.value()?;
        entries.push((key, value));
        cur.skip_ws();
        if cur.eat(',') {
            continue;
        }
        cur.expect('}')?;
        break;
    }
    Ok((name, entries))
}

struct Cursor<'a>(&'a str);

impl Cursor<'_> {
    fn skip_ws(&mut self) {
        self.0 = self.0.trim_start();
    }

    fn eat(&mut self, c: char) -> bool {
        match self.0.strip_prefix(c) {
            Some(r) => { self.0 = r; true }
            None => false,
        }
    }

    fn expect(&mut self, c: char) -> std::result::Result<(), String> {
        self.skip_ws();
        if self.eat(c) { Ok(()) } else { Err(format!("expected '{c}' at '{}'", self.0)) }
    }

    fn quoted(&mut self) -> std::result::Result<String, String> {
        self.skip_ws();
        let q = match self.0.chars().next() {
            Some(q @ ('"' | '\'')) => q,
            _ => return Err(format!("expected a quoted string at '{}'", self.0)),
        };
        let body = &self.0[1..];
        let end = body.find(q).ok_or("unterminated string")?;
        self.0 = &body[end + 1..];
        Ok(body[..end].to_string())
    }

    /// Quoted string or bare scalar up to the next `,` or `}`.
    fn value(&mut self) -> std::result::Result<String, String> {
        self.skip_ws();
        if self.0.starts_with(['"', '\'']) {
            return self.quoted();
        }
        let end = self.0.find([',', '}']).unwrap_or(self.0.len());
        let v = self.0[..end].trim().to_string();
        self.0 = &self.0[end..];
        if v.is_empty() { Err(s!("empty value")) } else { Ok(v) }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(p: &[(&str, &str)]) -> Vec<(String, String)> {
        p.iter().map(|(k, v)| (s!(*k), s!(*v))).collect()
    }

    #[test]
    fn remapping_is_lookup_with_pass_through() {
        assert_eq!(map_param_name(SELECTION_PARAM_MAP, "abcThres"), "Threshold");
        assert_eq!(map_param_name(EVALUATION_PARAM_MAP, "algThres"), "svm_th");
        assert_eq!(map_param_name(EVALUATION_PARAM_MAP, "method"), "method");
    }

    #[test]
    fn labels_map_to_form_values() {
        assert_eq!(wire_value(Software::ToxinPred, "method", "SVM(Swiss-Prot)").unwrap(), "1");
        assert_eq!(wire_value(Software::AlgPred2, "terminus", "aac based rf").unwrap(), "0");
        assert_eq!(wire_value(Software::AlgPred2, "svm_th", "0.3").unwrap(), "0.3");
        assert_eq!(wire_value(Software::IL10pred, "method", "1").unwrap(), "1");
    }

    #[test]
    fn lbtope_models_are_a_closed_set() {
        assert_eq!(wire_value(Software::LBtope, "for", "lbtope_variable").unwrap(), "flx");
        assert_eq!(wire_value(Software::LBtope, "for", "flx").unwrap(), "flx");

        let err = Task::new("lb", Software::LBtope, pairs(&[("lbModel", "LBtope_Fixed")])).unwrap_err();
        assert!(matches!(err, Error::Config(m) if m.contains("LBtope_Fixed") && m.contains("LBtope_Variable")));
    }

    #[test]
    fn user_params_merge_over_defaults() {
        let t = Task::new("tox", Software::ToxinPred, pairs(&[("toxinThval", "0.5")])).unwrap();
        assert_eq!(t.params.get("method"), Some("8"));
        assert_eq!(t.params.get("eval"), Some("10"));
        assert_eq!(t.params.get("thval"), Some("0.5"));
    }

    #[test]
    fn toxin_method_family_picks_label() {
        let given = pairs(&[
            ("toxinMethod", "Quantitative Matrix"),
            ("toxinSVMMethod", "SVM(Swiss-Prot)"),
            ("toxinQMMethod", "Dipeptide(TrEMBL)"),
        ]);
        let t = Task::new("t", Software::ToxinPred, given).unwrap();
        assert_eq!(t.params.get("method"), Some("8"));
    }

    #[test]
    fn lb_threshold_is_not_a_form_field() {
        let t = Task::new("lb", Software::LBtope, pairs(&[("lbThres", "60"), ("lbLength", "15")])).unwrap();
        assert_eq!(t.min_probability, 60.0);
        assert_eq!(t.params, FormParams::from_pairs(&[("for", "flx")]));
    }

    #[test]
    fn unknown_parameter_is_rejected() {
        let err = Task::new("a", Software::ABCpred, pairs(&[("toxinThval", "1")])).unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn auto_names_skip_taken_ones() {
        let mut set = TaskSet::new();
        set.insert(Task::new("ABCpred-1", Software::ABCpred, vec![]).unwrap());
        assert_eq!(set.next_name(Software::ABCpred), "ABCpred-2");
        assert_eq!(set.next_name(Software::LBtope), "LBtope-1");
    }

    #[test]
    fn summary_round_trips() {
        let text = "1) \"ABCpred-1\": {'software': 'ABCpred', 'abcWindow': '16', 'abcThres': 0.51, 'abcFilter': 'on'}\n\
                    2) \"LBtope-1\": {'software': 'LBtope', 'lbModel': 'LBtope_Variable', 'lbThres': '60', 'lbLength': 15}\n";
        let set = TaskSet::parse_summary(text).unwrap();
        assert_eq!(set.len(), 2);
        let abc = set.get("ABCpred-1").unwrap();
        assert_eq!(abc.params.get("window"), Some("16"));
        assert_eq!(abc.params.get("Threshold"), Some("0.51"));
        assert_eq!(set.get("LBtope-1").unwrap().min_probability, 60.0);

        let again = TaskSet::parse_summary(&set.render_summary()).unwrap();
        assert_eq!(again, set);
    }
}
