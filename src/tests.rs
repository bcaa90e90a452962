use expect_test::expect;

use crate::{Algorithm, AlgorithmNode, AlgorithmTree, ChunkKind, DiffConfig, DiffResult};

fn single(algorithm: Algorithm) -> DiffConfig {
    DiffConfig {
        tree: AlgorithmTree::single(algorithm),
        max_recursion_depth: 0,
    }
}

/// The standard composition rooted at patience instead of Myers.
fn patience_first() -> DiffConfig {
    let mut tree = AlgorithmTree::empty();
    let patience = tree.push(AlgorithmNode {
        algorithm: Algorithm::Patience,
        permitted_state_size: 0,
        inner: None,
        fallback: None,
    });
    let myers = tree.push(AlgorithmNode {
        algorithm: Algorithm::Myers,
        permitted_state_size: 0,
        inner: None,
        fallback: None,
    });
    let divide = tree.push(AlgorithmNode {
        algorithm: Algorithm::MyersDivide,
        permitted_state_size: 0,
        inner: Some(myers),
        fallback: None,
    });
    tree.node_mut(patience).inner = Some(patience);
    tree.node_mut(patience).fallback = Some(divide);
    tree.set_root(patience);
    DiffConfig {
        tree,
        max_recursion_depth: 0,
    }
}

/// The standard composition with a Myers budget too small for anything,
/// so every input lands on the fallback chain.
fn starved_myers() -> DiffConfig {
    let mut tree = AlgorithmTree::standard();
    let root = tree.root();
    tree.node_mut(root).permitted_state_size = 1;
    DiffConfig {
        tree,
        max_recursion_depth: 0,
    }
}

fn configs() -> Vec<(&'static str, DiffConfig)> {
    vec![
        ("standard", DiffConfig::default()),
        ("myers", single(Algorithm::Myers)),
        ("myers_divide", single(Algorithm::MyersDivide)),
        ("patience_first", patience_first()),
        ("starved_myers", starved_myers()),
        ("trivial", single(Algorithm::Trivial)),
    ]
}

/// Coverage, equality soundness, maximality and patchability, checked
/// for every result that leaves the engine.
fn check_invariants(left: &[u8], right: &[u8], diff: &DiffResult<'_>) {
    let mut at_left = 0;
    let mut at_right = 0;
    for chunk in diff.chunks() {
        assert_eq!(chunk.left.start, at_left, "left spans must be seamless");
        assert_eq!(chunk.right.start, at_right, "right spans must be seamless");
        at_left = chunk.left.end;
        at_right = chunk.right.end;
        match chunk.kind() {
            ChunkKind::Equal => {
                assert_eq!(
                    chunk.left.end - chunk.left.start,
                    chunk.right.end - chunk.right.start
                );
                for (i, j) in chunk.left.clone().zip(chunk.right.clone()) {
                    assert_eq!(
                        diff.left().atom_bytes(i),
                        diff.right().atom_bytes(j),
                        "equal chunks must be byte-equal"
                    );
                }
            }
            ChunkKind::Removal | ChunkKind::Addition => {}
            ChunkKind::Unsolved => panic!("unsolved chunk in a finished result"),
        }
    }
    assert_eq!(at_left, diff.left().len());
    assert_eq!(at_right, diff.right().len());

    for pair in diff.chunks().windows(2) {
        assert!(
            !(pair[0].is_equal() && pair[1].is_equal()),
            "equal runs must be maximal"
        );
    }

    let mut patched = Vec::new();
    let mut reverted = Vec::new();
    for chunk in diff.chunks() {
        match chunk.kind() {
            ChunkKind::Equal => {
                for i in chunk.left.clone() {
                    patched.extend_from_slice(diff.left().atom_bytes(i));
                }
                for j in chunk.right.clone() {
                    reverted.extend_from_slice(diff.right().atom_bytes(j));
                }
            }
            ChunkKind::Removal => {
                for i in chunk.left.clone() {
                    reverted.extend_from_slice(diff.left().atom_bytes(i));
                }
            }
            ChunkKind::Addition => {
                for j in chunk.right.clone() {
                    patched.extend_from_slice(diff.right().atom_bytes(j));
                }
            }
            ChunkKind::Unsolved => unreachable!(),
        }
    }
    assert_eq!(patched, right, "applying the chunks must reproduce the right side");
    assert_eq!(reverted, left, "reverse-applying the chunks must reproduce the left side");
}

fn dump(diff: &DiffResult<'_>) -> String {
    let mut out = String::new();
    for chunk in diff.chunks() {
        let marker = match chunk.kind() {
            ChunkKind::Equal => '=',
            ChunkKind::Removal => '-',
            ChunkKind::Addition => '+',
            ChunkKind::Unsolved => '?',
        };
        out.push_str(&format!(
            "{} {}..{} {}..{}\n",
            marker, chunk.left.start, chunk.left.end, chunk.right.start, chunk.right.end
        ));
    }
    out
}

#[test]
fn invariants_hold_across_configurations() {
    let block: Vec<u8> = (0..30).flat_map(|i| format!("{i}\n").into_bytes()).collect();
    let mut shifted = b"start\n".to_vec();
    shifted.extend_from_slice(&block);
    let repeated_left: Vec<u8> = b"x\n".repeat(25);
    let repeated_right: Vec<u8> = b"x\ny\n".repeat(15);
    let cases: Vec<(&[u8], &[u8])> = vec![
        (b"", b""),
        (b"", b"x\n"),
        (b"x\n", b""),
        (b"a\nb\nc\n", b"a\nb\nc\n"),
        (b"A\nB\nC\nD\nE\n", b"X\nB\nC\nY\n"),
        (b"1\n2\n3\n4\n", b"1\n4\n2\n3\n"),
        (b"a\nb\nc\nd\ne\nf\ng\n", b"a\nc\nb\nd\nf\ne\ng\n"),
        (b"fn a() {}\n\nfn b() {}\n", b"fn a() {}\n\nfn c() {}\n\nfn b() {}\n"),
        (b"one\r\ntwo\r\n", b"one\ntwo\n"),
        (b"tail", b"tail\n"),
        (b"a\na\na\n", b"a\na\n"),
        (&block, &shifted),
        (&repeated_left, &repeated_right),
    ];
    for (left, right) in cases {
        for (name, config) in configs() {
            let diff = config.diff(left, right).unwrap();
            check_invariants(left, right, &diff);
            // determinism: the chunk stream is a pure function of the inputs
            let again = config.diff(left, right).unwrap();
            assert_eq!(
                diff.chunks(),
                again.chunks(),
                "{name} must be deterministic"
            );
        }
    }
}

#[test]
fn equal_inputs_are_a_single_equal_chunk() {
    for (name, config) in configs() {
        let diff = config.diff(b"a\nb\nc\n", b"a\nb\nc\n").unwrap();
        assert!(diff.is_identical(), "{name}");
        assert_eq!(diff.chunks().len(), 1, "{name}");
        assert_eq!(diff.chunks()[0].left, 0..3, "{name}");
    }
}

#[test]
fn pure_insertion_and_pure_deletion() {
    for (name, config) in configs() {
        let diff = config.diff(b"", b"x\n").unwrap();
        assert_eq!(diff.chunks().len(), 1, "{name}");
        let chunk = &diff.chunks()[0];
        assert_eq!(chunk.kind(), ChunkKind::Addition, "{name}");
        assert_eq!(chunk.left, 0..0);
        assert_eq!(chunk.right, 0..1);

        let diff = config.diff(b"x\n", b"").unwrap();
        assert_eq!(diff.chunks().len(), 1, "{name}");
        let chunk = &diff.chunks()[0];
        assert_eq!(chunk.kind(), ChunkKind::Removal, "{name}");
        assert_eq!(chunk.left, 0..1);
        assert_eq!(chunk.right, 0..0);
    }
}

#[test]
fn myers_classic_example() {
    // deletions sort before insertions, the B/C snake stays intact
    for config in [DiffConfig::default(), single(Algorithm::Myers)] {
        let diff = config.diff(b"A\nB\nC\nD\nE\n", b"X\nB\nC\nY\n").unwrap();
        expect![[r#"
            - 0..1 0..0
            + 1..1 0..1
            = 1..3 1..3
            - 3..5 3..3
            + 5..5 3..4
        "#]]
        .assert_eq(&dump(&diff));
    }
}

#[test]
fn patience_anchors_reordered_lines() {
    let config = patience_first();
    let diff = config.diff(b"1\n2\n3\n4\n", b"1\n4\n2\n3\n").unwrap();
    expect![[r#"
        = 0..1 0..1
        - 1..3 1..1
        = 3..4 1..2
        + 4..4 2..4
    "#]]
    .assert_eq(&dump(&diff));
}

#[test]
fn starved_myers_still_solves_disjoint_inputs() {
    // no common-unique atoms and no Myers budget: the divide pass has to
    // carry the whole diff
    let config = starved_myers();
    let left = b"a\na\na\na\n";
    let right = b"b\nb\nb\n";
    let diff = config.diff(left, right).unwrap();
    check_invariants(left, right, &diff);
    assert_eq!(diff.count_removals(), 4);
    assert_eq!(diff.count_additions(), 3);
}

#[test]
fn depth_exhaustion_degrades_to_trivial() {
    let config = DiffConfig {
        tree: patience_first().tree,
        max_recursion_depth: 1,
    };
    let left = b"a\nq\nr\nb\n";
    let right = b"a\ns\nb\n";
    let diff = config.diff(left, right).unwrap();
    check_invariants(left, right, &diff);
}

#[test]
fn unbounded_myers_stays_minimal() {
    // with no state cap the full search must not fall back to the
    // trivial algorithm, which would merge everything into one
    // remove/add pair
    let diff = single(Algorithm::Myers)
        .diff(b"A\nB\nC\nD\nE\n", b"X\nB\nC\nY\n")
        .unwrap();
    assert_eq!(diff.chunks().len(), 5);
    assert_eq!(diff.count_removals(), 3);
    assert_eq!(diff.count_additions(), 2);
}

#[cfg(feature = "format")]
mod format {
    use expect_test::expect;

    use super::{DiffConfig, DiffResult};
    use crate::format::{write_context, write_ed, write_plain, write_unified};

    fn classic() -> DiffResult<'static> {
        DiffConfig::default()
            .diff(b"A\nB\nC\nD\nE\n", b"X\nB\nC\nY\n")
            .unwrap()
    }

    fn render(write: impl FnOnce(&mut Vec<u8>) -> std::io::Result<()>) -> String {
        let mut out = Vec::new();
        write(&mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn unified() {
        let diff = classic();
        expect![[r#"
            @@ -1,5 +1,4 @@
            -A
            +X
             B
             C
            -D
            -E
            +Y
        "#]]
        .assert_eq(&render(|out| write_unified(&diff, 3, out)));
    }

    #[test]
    fn unified_splits_distant_changes_into_hunks() {
        let left: Vec<u8> = (0..20).flat_map(|i| format!("{i}\n").into_bytes()).collect();
        let right: Vec<u8> = (0..20)
            .flat_map(|i| match i {
                2 => b"two\n".to_vec(),
                15 => b"fifteen\n".to_vec(),
                _ => format!("{i}\n").into_bytes(),
            })
            .collect();
        let diff = DiffConfig::default().diff(&left, &right).unwrap();
        expect![[r#"
            @@ -1,5 +1,5 @@
             0
             1
            -2
            +two
             3
             4
            @@ -14,5 +14,5 @@
             13
             14
            -15
            +fifteen
             16
             17
        "#]]
        .assert_eq(&render(|out| write_unified(&diff, 2, out)));
    }

    #[test]
    fn unified_marks_missing_final_newline() {
        let diff = DiffConfig::default().diff(b"a\nb", b"a\nc").unwrap();
        expect![[r#"
            @@ -1,2 +1,2 @@
             a
            -b
            \ No newline at end of file
            +c
            \ No newline at end of file
        "#]]
        .assert_eq(&render(|out| write_unified(&diff, 3, out)));
    }

    #[test]
    fn context() {
        let diff = classic();
        expect![[r#"
            ***************
            *** 1,5 ****
            ! A
              B
              C
            ! D
            ! E
            --- 1,4 ----
            ! X
              B
              C
            ! Y
        "#]]
        .assert_eq(&render(|out| write_context(&diff, 3, out)));
    }

    #[test]
    fn ed_script() {
        let diff = classic();
        expect![[r#"
            4,5c
            Y
            .
            1c
            X
            .
        "#]]
        .assert_eq(&render(|out| write_ed(&diff, false, out)));
    }

    #[test]
    fn forward_ed_script() {
        let diff = classic();
        expect![[r#"
            c1
            X
            .
            c4 5
            Y
            .
        "#]]
        .assert_eq(&render(|out| write_ed(&diff, true, out)));
    }

    #[test]
    fn plain_listing() {
        let diff = classic();
        expect![[r#"
            -A
            +X
             B
             C
            -D
            -E
            +Y
        "#]]
        .assert_eq(&render(|out| write_plain(&diff, out)));
    }

    #[test]
    fn pure_insertion_hunk_names_the_line_before() {
        let diff = DiffConfig::default().diff(b"a\n", b"x\na\n").unwrap();
        expect![[r#"
            @@ -0,0 +1,1 @@
            +x
        "#]]
        .assert_eq(&render(|out| write_unified(&diff, 0, out)));
    }
}
