//! Chunked scan behaviour under interleaved edits.

use std::cell::RefCell;
use std::sync::Arc;

use pretty_assertions::assert_eq;
use trellis_constraint::{CheckerOptions, ScanStatus};
use trellis_core::Record;
use trellis_graph::{ElementAnchor, SlotRef, ValueAnchor};
use trellis_metamodel::Metamodel;
use trellis_tests::prelude::*;
use trellis_workspace::{drive_scan, Workspace, WorkspaceOptions};

fn workspace(chunk_size: usize, classes: usize) -> Workspace {
    let metamodel = Arc::new(Metamodel::from_json(PACKAGE_METAMODEL).unwrap());
    let options = WorkspaceOptions::new().with_checker(CheckerOptions::new().with_chunk_size(chunk_size));
    let mut ws = Workspace::new(metamodel, options).unwrap();
    let records: Vec<Record> = (0..classes).map(|i| class(&format!("C{i}"))).collect();
    ws.create_element(ElementAnchor::Bottom(SlotRef::Root), records)
        .unwrap();
    ws
}

fn steps_until_done(ws: &mut Workspace) -> usize {
    let mut steps = 1;
    while ws.step() == ScanStatus::Yielded {
        steps += 1;
    }
    steps
}

#[test]
fn test_chunks_cover_whole_tree() {
    let mut ws = workspace(3, 7);
    assert!(ws.scan_pending());

    // 7 elements in chunks of 3: two full chunks, then the rest finishes
    assert_eq!(steps_until_done(&mut ws), 3);
    assert!(!ws.scan_pending());
    assert_eq!(ws.step(), ScanStatus::Idle);
}

#[test]
fn test_edit_restarts_pass() {
    let mut ws = workspace(2, 6);
    assert_eq!(ws.step(), ScanStatus::Yielded);
    assert_eq!(ws.step(), ScanStatus::Yielded);

    // an unnamed class lands behind the part already visited
    let added = ws
        .create_element(ElementAnchor::Bottom(SlotRef::Root), Record::new("Class"))
        .unwrap()[0];
    assert!(ws.scan_pending());

    // the new pass starts over: 7 elements in chunks of 2
    assert_eq!(steps_until_done(&mut ws), 4);
    assert_eq!(
        ws.feature_problems(added, "name").unwrap(),
        vec!["'name' must be specified"]
    );
    assert_eq!(ws.problem_count(), 1);
}

#[test]
fn test_removed_element_is_skipped() {
    let mut ws = workspace(1, 4);
    assert_eq!(ws.step(), ScanStatus::Yielded);

    let last = resolve(&ws, "/C3").unwrap();
    ws.set_automatic_checking(false);
    ws.remove_element(&[last]).unwrap();

    // no new request: the running pass continues past the removed element
    assert_eq!(steps_until_done(&mut ws), 3);
    assert!(ws.is_valid());
}

#[test]
fn test_problems_are_stale_until_scanned() {
    let mut ws = workspace(100, 1);
    ws.settle();
    let c0 = resolve(&ws, "/C0").unwrap();
    let final_feature = ws.feature_of(c0, "final").unwrap();

    ws.create_value(
        ValueAnchor::Bottom {
            element: c0,
            feature: final_feature,
        },
        "maybe",
    )
    .unwrap();
    assert!(ws.problems().is_empty());
    assert!(!ws.is_valid());

    ws.settle();
    assert_eq!(ws.feature_problems(c0, "final").unwrap(), vec!["value not allowed"]);
}

#[tokio::test]
async fn test_async_drive_with_concurrent_edits() {
    let ws = RefCell::new(workspace(1, 10));

    let edits = async {
        for name in ["X", "Y"] {
            tokio::task::yield_now().await;
            ws.borrow_mut()
                .create_element(ElementAnchor::Bottom(SlotRef::Root), class(name))
                .unwrap();
        }
        tokio::task::yield_now().await;
        ws.borrow_mut()
            .create_element(ElementAnchor::Bottom(SlotRef::Root), class("X"))
            .unwrap();
    };
    let (status, ()) = tokio::join!(drive_scan(&ws), edits);

    assert_eq!(status, ScanStatus::Finished);
    let ws = ws.borrow();
    assert!(!ws.scan_pending());
    assert_eq!(ws.get_element("/X").map(|binding| binding.elements().len()), Some(2));
    assert_eq!(ws.problem_count(), 2);
}
