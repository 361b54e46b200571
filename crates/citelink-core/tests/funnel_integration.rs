//! End-to-end checks of the title funnel and the mention matcher over a small
//! hand-written corpus.

use citelink_core::{
    Author, AuthorRegistry, Corpus, Funnel, Paper, Stage, match_authors, run_funnel, self_check,
};

fn corpus() -> Corpus {
    Corpus::new(vec![
        Paper::new(
            101,
            "Neural Network Training Methods",
            "[1] Doe, J.: Graph kernels for molecules. JMLR (2003)\n\
             [2] Roe, K.: A deep learning model. (2010)",
            "John Smith; Ann Lee",
        ),
        Paper::new(
            102,
            "Graph Kernels for Molecules",
            "[1] J. Smith, A. Lee: Neural netwrk training methods. NIPS (2001)",
            "Jane Doe",
        ),
        Paper::new(
            103,
            "A Deep Learning Model",
            "[1] J. Smith: Neural network training methods. In: NIPS, 2001.\n\
             [2] Doe J. Graph kernels for molecules, 2003",
            "Kim Roe",
        ),
        // Cites 101 by title but the author listing never appears
        Paper::new(
            104,
            "Survey of Everything",
            "[1] Anonymous: Neural network training methods. 2001",
            "Pat Poe",
        ),
        // Shares words with 101's title without aligning
        Paper::new(
            105,
            "Methods Network Neural Training",
            "[1] Smith J. Training of neural network methods. 2002",
            "Lou Loe",
        ),
    ])
    .unwrap()
}

#[test]
fn final_matches_resolve_real_citations() {
    let report = run_funnel(&corpus());
    let finals = report.final_matches();

    assert_eq!(finals.citing(101), [102, 103]);
    assert_eq!(finals.citing(102), [101, 103]);
    assert_eq!(finals.citing(103), [101]);
    assert!(finals.citing(104).is_empty());
}

#[test]
fn author_stage_drops_anonymous_citation() {
    let report = run_funnel(&corpus());
    assert!(report.ordered.matches.contains(101, 104));
    assert!(!report.author_validated.matches.contains(101, 104));
}

#[test]
fn unaligned_overlap_stops_before_ordered_stage() {
    let report = run_funnel(&corpus());
    assert!(report.candidate.matches.contains(101, 105));
    assert!(!report.ordered.matches.contains(101, 105));
}

#[test]
fn funnel_is_monotone() {
    let report = run_funnel(&corpus());
    assert!(report.adjacency.matches.is_subset_of(&report.candidate.matches));
    assert!(report.ordered.matches.is_subset_of(&report.adjacency.matches));
    assert!(
        report
            .author_validated
            .matches
            .is_subset_of(&report.ordered.matches)
    );

    let counts: Vec<usize> = report.stages().map(|s| s.total_relations).collect();
    assert!(counts.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn no_stage_contains_self_citation() {
    let report = run_funnel(&corpus());
    for stage in report.stages() {
        for (cited, citing) in stage.matches.pairs() {
            assert_ne!(cited, citing, "self-citation in {}", stage.stage);
        }
    }
}

#[test]
fn output_is_deterministic() {
    let corpus = corpus();
    assert_eq!(run_funnel(&corpus), run_funnel(&corpus));
}

#[test]
fn progress_events_cover_every_stage() {
    use std::cell::RefCell;

    let corpus = corpus();
    let finished = RefCell::new(Vec::new());
    Funnel::new(&corpus).run(&|event| {
        if let citelink_core::ProgressEvent::StageFinished { stage, .. } = event {
            finished.borrow_mut().push(stage);
        }
    });
    assert_eq!(finished.into_inner(), Stage::ALL.to_vec());
}

#[test]
fn mentions_and_self_check() {
    let corpus = corpus();
    let registry = AuthorRegistry::new(vec![
        Author::new(1, "John Smith"),
        Author::new(2, "Jane Q. Doe"),
        Author::new(3, "Kim Roe"),
    ])
    .unwrap();

    let edges = match_authors(&corpus, &registry, None).unwrap();
    let smith: Vec<u64> = edges
        .iter()
        .filter(|e| e.author_id == 1)
        .map(|e| e.paper_id)
        .collect();
    // 105 writes "Smith J." which is not the initial form
    assert_eq!(smith, vec![102, 103]);

    let check = self_check(&edges, &registry, &corpus).unwrap().unwrap();
    assert_eq!(check.author.name, "John Smith");
    assert_eq!(check.blocks.len(), 2);
    assert!(check.blocks.iter().all(|(_, block)| block.contains("J. Smith")));
}

#[test]
fn unknown_paper_lookup_fails() {
    let err = corpus().paper(3107).unwrap_err();
    assert_eq!(err.to_string(), "unknown paper id 3107");
}
