// tests/selection_e2e.rs
mod common;

use std::time::Duration;

use common::{HBA, HBB, ScriptedLauncher, Submission};
use immuno_scrape::config::options::{RunFile, RunOptions, WaitOptions};
use immuno_scrape::config::tasks::{Task, TaskSet};
use immuno_scrape::core::fasta::Record;
use immuno_scrape::progress::RecordingProgress;
use immuno_scrape::regions;
use immuno_scrape::runner;
use immuno_scrape::specs::Software;
use immuno_scrape::core::CancelToken;

/// ABCpred-like result page: windows of the requested length every 10 residues.
fn abcpred_page(sub: &Submission) -> String {
    let seq = sub.typed("SEQ").unwrap_or_default();
    let name = sub.typed("SEQNAME").unwrap_or("seq?");
    let window: usize = sub.clicked("window").and_then(|w| w.parse().ok()).unwrap_or(10);

    let mut rows = String::new();
    let mut start = 0;
    let mut rank = 1;
    while start + window <= seq.len() {
        rows.push_str(&format!(
            "<tr><td>{rank}</td><td>{}</td><td>{}</td><td>{:.2}</td></tr>\n",
            &seq[start..start + window],
            start + 1,
            0.95 - 0.05 * rank as f64
        ));
        start += 10;
        rank += 1;
    }
    format!(
        r#"<html><body>
<table width="60% bgcolor=" border=1><tr><td><b>Sequence name</b></td><td>: {name}</td></tr></table>
<table width="75% bgcolor=" border=1><tbody>
<tr><td><b>Rank</b></td><td><b>Sequence</b></td><td><b>Start position</b></td><td><b>Score</b></td></tr>
{rows}</tbody></table></body></html>"#
    )
}

/// LBtope: a link page, then the text dump behind it.
fn lbtope_page(sub: &Submission) -> String {
    if sub.link.is_none() {
        return s("<html><body><a href='dl.txt'>Download results as a text file</a></body></html>");
    }
    let mut dump = s("LBtope results\n");
    for (id, seq) in common::fasta_pairs(sub.typed("seq").unwrap_or_default()) {
        dump.push_str(&format!("Protein Id : >{id}\n"));
        dump.push_str(&format!("{} 0.70 90\n", &seq[0..15]));
        dump.push_str(&format!("{} 0.20 40\n", &seq[5..20]));
        dump.push_str(&format!("{} 0.55 81\n", &seq[10..25]));
    }
    dump
}

fn s(x: &str) -> String {
    x.to_string()
}

fn opts(dir: &std::path::Path) -> RunOptions {
    RunOptions {
        jobs: 2,
        wait: WaitOptions { poll: Duration::from_millis(10), timeout: Some(Duration::from_secs(5)) },
        scratch_dir: dir.to_path_buf(),
        ..Default::default()
    }
}

fn records() -> Vec<Record> {
    vec![Record::new("HBA_HUMAN", HBA), Record::new("HBB_HUMAN", HBB)]
}

#[test]
fn abcpred_window_16_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = ScriptedLauncher::new(abcpred_page);
    let mut tasks = TaskSet::new();
    tasks.insert(Task::new("ABCpred-1", Software::ABCpred, vec![(s("abcWindow"), s("16"))]).unwrap());

    let recs = records();
    let seqs: Vec<String> = recs.iter().map(|r| r.seq.clone()).collect();
    let mut progress = RecordingProgress::default();
    let index = runner::select_epitopes(&seqs, &tasks, &launcher, &opts(dir.path()), &mut progress, &CancelToken::new())
        .unwrap();

    assert!(index.is_complete());
    assert_eq!(progress.done, vec![s("ABCpred-1")]);

    // one page visit per sequence, each with the window and the other defaults
    let subs = launcher.submissions();
    assert_eq!(subs.len(), 2);
    assert_eq!(subs[1].typed("SEQNAME"), Some("seq2"));
    assert_eq!(subs[0].clicked("window"), Some("16"));
    assert_eq!(subs[0].clicked("filter"), Some("on"));

    let tables = index.get("ABCpred-1").unwrap();
    let t = tables.get("seq1").unwrap();
    assert_eq!(t.labels(), vec!["Rank", "Sequence", "Position", "Score"]);
    for ((ep, pos), score) in t.column("Sequence").unwrap().iter().zip(t.column("Position").unwrap()).zip(t.column("Score").unwrap()) {
        assert_eq!(ep.len(), 16);
        assert!(pos.parse::<usize>().is_ok());
        assert!(score.parse::<f64>().is_ok());
    }

    let regs = regions::regions(&index, &recs);
    assert_eq!(regs[0].name, "ABCpred-1_ROI_1-17");
    assert_eq!(regs[0].sequence, "HBA_HUMAN");
    assert!(regs.iter().any(|r| r.sequence == "HBB_HUMAN"));
    assert!(regs.iter().all(|r| r.end - r.start == 16));
}

#[test]
fn lbtope_threshold_filters_rows() {
    let dir = tempfile::tempdir().unwrap();
    let launcher = ScriptedLauncher::new(lbtope_page);
    let rf = RunFile::parse(
        r#"
        [[selector]]
        software = "LBtope"
        lbModel = "LBtope_Variable"
        lbThres = 80
        "#,
    )
    .unwrap();
    let tasks = rf.selectors().unwrap();

    let seqs = vec![s(HBA), s(HBB)];
    let mut options = opts(dir.path());
    options.max_chunk = 0;
    let index = runner::select_epitopes(&seqs, &tasks, &launcher, &options, &mut RecordingProgress::default(), &CancelToken::new())
        .unwrap();

    let subs = launcher.submissions();
    assert_eq!(subs.len(), 1, "both sequences in one FASTA payload");
    assert_eq!(subs[0].clicked("for"), Some("flx"));

    let tables = index.get("LBtope-1").unwrap();
    assert_eq!(tables.len(), 2);
    let t = tables.get("seq2").unwrap();
    assert_eq!(t.column("Position").unwrap(), &[s("1"), s("3")]);
    assert_eq!(t.column("Score").unwrap(), &[s("0.70"), s("0.55")]);
}

#[test]
fn evaluators_are_rejected_as_selectors() {
    let launcher = ScriptedLauncher::new(abcpred_page);
    let mut tasks = TaskSet::new();
    tasks.insert(Task::new("tox", Software::ToxinPred, Vec::new()).unwrap());
    let err = runner::select_epitopes(&[s(HBA)], &tasks, &launcher, &RunOptions::default(), &mut RecordingProgress::default(), &CancelToken::new());
    assert!(matches!(err, Err(immuno_scrape::Error::Validation(_))));
    assert_eq!(launcher.launches.load(std::sync::atomic::Ordering::SeqCst), 0);
}

#[test]
fn empty_input_selects_nothing() {
    let launcher = ScriptedLauncher::new(abcpred_page);
    let mut tasks = TaskSet::new();
    tasks.insert(Task::new("ABCpred-1", Software::ABCpred, Vec::new()).unwrap());

    let index = runner::select_epitopes(&[], &tasks, &launcher, &RunOptions::default(), &mut RecordingProgress::default(), &CancelToken::new())
        .unwrap();
    assert_eq!(launcher.launches.load(std::sync::atomic::Ordering::SeqCst), 0);
    assert!(index.get("ABCpred-1").unwrap().is_empty());
    assert!(regions::regions(&index, &[]).is_empty());
}
