// benches/parsers.rs
use criterion::{criterion_group, criterion_main, Criterion, black_box};

use immuno_scrape::specs::{lbtope, toxinpred};

/// ToxinPred-style result page with `n` rows, every third one hidden by the pager.
fn toxinpred_page(n: usize) -> String {
    let mut rows = String::new();
    for i in 1..=n {
        let style = if i % 3 == 0 { r#" style="display: none;""# } else { "" };
        rows.push_str(&format!(
            "<tr{style}><td>seq{i}</td><td>KVGAHAGEYGAEALER</td><td>{:.2}</td><td>Non-Toxin</td></tr>\n",
            (i as f64 * 0.37).sin()
        ));
    }
    format!(
        r#"<html><body><table id="tableTwo" class="tablesorter">
<thead><tr><th>Peptide ID</th><th>Peptide Sequence</th><th>SVM Score</th><th>Prediction</th></tr></thead>
<tbody>{rows}</tbody></table><input type="text" class="pagedisplay" value="1/1"></body></html>"#
    )
}

/// LBtope dump: `proteins` proteins with `per` epitopes each.
fn lbtope_dump(proteins: usize, per: usize) -> String {
    let residues = b"ACDEFGHIKLMNPQRSTVWY";
    let mut out = String::from("LBtope results\n");
    for p in 1..=proteins {
        out.push_str(&format!("Protein Id : >seq{p}\n"));
        for e in 0..per {
            let ep: String = (0..15).map(|k| residues[(p * 7 + e * 3 + k) % residues.len()] as char).collect();
            out.push_str(&format!("{ep} 0.{:02} {}\n", e % 100, 50 + e % 50));
        }
    }
    out
}

fn bench_parsers(c: &mut Criterion) {
    let page = toxinpred_page(500);
    let dump = lbtope_dump(20, 200);

    c.bench_function("toxinpred_table", |b| {
        b.iter(|| {
            let t = toxinpred::parse(black_box(&page)).map(|t| t.len()).unwrap_or(0);
            black_box(t)
        })
    });

    c.bench_function("lbtope_dump", |b| {
        b.iter(|| {
            let out = lbtope::parse_dump(black_box(&dump), 78.0);
            black_box(out.len())
        })
    });
}

criterion_group!(benches, bench_parsers);
criterion_main!(benches);
