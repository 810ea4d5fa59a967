mod common;

use anyhow::{Context, Result};
use common::{base_files, file, rows};
use sftree_core::{ChangeRecorder, Notification, PersistentIndexes, TreeConfig};
use sftree_files::{
    FileFilter, FileSort, FileView, SortColumn, SortOrder, TorrentFile, ViewSettings,
};

fn recorded_view(files: Vec<TorrentFile>) -> Result<FileView<ChangeRecorder>> {
    sftree_telemetry::init_test_logging();
    let mut view = FileView::from_parts(
        TreeConfig::default(),
        FileSort::default(),
        FileFilter::default(),
        ChangeRecorder::default(),
    )?;
    view.assign(files);
    view.observer_mut().take();
    Ok(view)
}

#[test]
fn assign_groups_files_under_directories() -> Result<()> {
    let view = recorded_view(base_files())?;
    let root = view.root();

    assert_eq!(view.child_count(root), 2);
    assert_eq!(rows(&view, root), ["dir/", "root.txt"]);
    let dir = view.find_page("dir").context("dir page")?;
    assert_eq!(rows(&view, dir), ["a.txt", "b.txt"]);
    assert_eq!(view.leaf_count(), 3);
    assert_eq!(view.page_data(dir).map(|stats| stats.size_bytes), Some(3));
    Ok(())
}

#[test]
fn name_filter_keeps_directories_with_matches() -> Result<()> {
    let mut view = recorded_view(base_files())?;
    let root = view.root();
    let dir = view.find_page("dir").context("dir page")?;

    view.filter_by(FileFilter::named("a"));

    assert_eq!(view.child_count(root), 1);
    assert_eq!(rows(&view, root), ["dir/"]);
    assert_eq!(rows(&view, dir), ["a.txt"]);
    assert_eq!(view.total_children(root), 2);

    let remaps: Vec<_> = view.observer().remaps().cloned().collect();
    let root_remap = remaps
        .iter()
        .find(|remap| remap.page == root)
        .context("root remap")?;
    assert_eq!(root_remap.rows, vec![Some(0), None]);
    assert!(root_remap.lost_pages.is_empty());
    let dir_remap = remaps
        .iter()
        .find(|remap| remap.page == dir)
        .context("dir remap")?;
    assert_eq!(dir_remap.rows, vec![Some(0), None]);
    Ok(())
}

#[test]
fn upsert_of_existing_path_updates_in_place() -> Result<()> {
    let mut view = recorded_view(base_files())?;
    let dir = view.find_page("dir").context("dir page")?;

    view.upsert(vec![file("dir/a.txt", 5)]);

    let events = view.observer().events();
    assert!(
        events
            .iter()
            .all(|event| matches!(event, Notification::RowsChanged { .. }))
    );
    assert!(events.contains(&Notification::RowsChanged {
        page: dir,
        rows: vec![0],
    }));
    assert_eq!(rows(&view, dir), ["a.txt", "b.txt"]);
    assert_eq!(
        view.find_leaf("dir/a.txt").map(|file| file.size_bytes),
        Some(5)
    );
    assert_eq!(view.page_data(dir).map(|stats| stats.size_bytes), Some(7));
    assert_eq!(view.leaf_count(), 3);
    Ok(())
}

#[test]
fn erase_and_insert_in_one_batch_remaps_rows() -> Result<()> {
    let mut view = recorded_view(base_files())?;
    let dir = view.find_page("dir").context("dir page")?;

    view.apply_delta(["dir/a.txt"], Vec::new(), vec![file("dir/c.txt", 4)]);

    assert_eq!(view.find_page("dir"), Some(dir));
    assert_eq!(view.total_children(dir), 2);
    assert_eq!(rows(&view, dir), ["b.txt", "c.txt"]);
    let remap = view
        .observer()
        .remaps()
        .find(|remap| remap.page == dir)
        .context("dir remap")?;
    assert_eq!(remap.rows, vec![None, Some(0)]);
    assert_eq!(
        view.child_by_name(dir, "c.txt").map(|(row, _)| row),
        Some(1)
    );
    Ok(())
}

#[test]
fn erasing_every_file_prunes_the_directory() -> Result<()> {
    let mut view = recorded_view(base_files())?;
    let root = view.root();
    let dir = view.find_page("dir").context("dir page")?;

    view.erase(["dir/a.txt", "dir/b.txt"]);

    assert_eq!(rows(&view, root), ["root.txt"]);
    assert!(view.find_page("dir").is_none());
    assert!(!view.contains_page(dir));
    let remap = view
        .observer()
        .remaps()
        .find(|remap| remap.page == root)
        .context("root remap")?;
    assert_eq!(remap.rows, vec![None, Some(0)]);
    assert_eq!(remap.lost_pages, vec![dir]);
    Ok(())
}

#[test]
fn persistent_handles_follow_resorts_until_hidden() -> Result<()> {
    sftree_telemetry::init_test_logging();
    let mut view: FileView<PersistentIndexes> = FileView::new();
    view.assign(base_files());
    let dir = view.find_page("dir").context("dir page")?;
    let handle = view.persist(dir, 1).context("b.txt is visible")?;

    view.sort_by(FileSort::new(SortColumn::Size, SortOrder::Descending));
    assert_eq!(rows(&view, dir), ["b.txt", "a.txt"]);
    assert_eq!(rows(&view, view.root()), ["dir/", "root.txt"]);
    assert_eq!(view.resolve(handle), Some((dir, 0)));

    view.filter_by(FileFilter::named("root"));
    assert_eq!(view.resolve(handle), None);
    assert!(view.persist(dir, 0).is_none());
    Ok(())
}

#[test]
fn settings_document_configures_the_view() -> Result<()> {
    sftree_telemetry::init_test_logging();
    let settings = ViewSettings::from_json(
        r#"{ "sort_column": "size", "sort_order": "descending", "filter": ".TXT" }"#,
    )?;
    let mut view = settings.build_view(ChangeRecorder::default())?;
    view.assign(vec![
        file("music/one.flac", 40),
        file("music/liner.txt", 2),
        file("small.txt", 1),
        file("big.txt", 9),
    ]);

    assert_eq!(rows(&view, view.root()), ["music/", "big.txt", "small.txt"]);
    let music = view.find_page("music").context("music page")?;
    assert_eq!(rows(&view, music), ["liner.txt"]);
    assert_eq!(
        view.page_data(music).map(|stats| stats.visible_entries),
        Some(1)
    );
    Ok(())
}

#[test]
fn backslash_separator_filters_by_file_name() -> Result<()> {
    sftree_telemetry::init_test_logging();
    let config = TreeConfig {
        separator: '\\',
        ..TreeConfig::default()
    };
    let mut view = FileView::from_parts(
        config,
        FileSort::default(),
        FileFilter::default(),
        ChangeRecorder::default(),
    )?;
    view.assign(vec![file("music\\one.flac", 4), file("music\\two.txt", 1)]);
    let music = view.find_page("music").context("music page")?;
    assert_eq!(rows(&view, music), ["one.flac", "two.txt"]);

    view.filter_by(FileFilter::named("music"));
    assert_eq!(view.visible_leaves().count(), 0);
    assert_eq!(view.child_count(view.root()), 0);

    view.filter_by(FileFilter::named("two"));
    let visible: Vec<_> = view.visible_leaves().map(|file| file.path.clone()).collect();
    assert_eq!(visible, ["music\\two.txt"]);
    assert_eq!(rows(&view, music), ["two.txt"]);
    Ok(())
}

#[test]
fn unsorted_view_restores_insertion_order_after_filtering() -> Result<()> {
    sftree_telemetry::init_test_logging();
    let mut view = FileView::from_parts(
        TreeConfig::default(),
        FileSort::new(SortColumn::None, SortOrder::Ascending),
        FileFilter::default(),
        ChangeRecorder::default(),
    )?;
    view.assign(vec![file("a.txt", 3), file("b.bin", 2), file("c.txt", 1)]);
    let root = view.root();

    view.filter_by(FileFilter::named("txt"));
    assert_eq!(rows(&view, root), ["a.txt", "c.txt"]);
    view.filter_by(FileFilter::default());
    assert_eq!(rows(&view, root), ["a.txt", "b.bin", "c.txt"]);

    view.sort_by(FileSort::new(SortColumn::Size, SortOrder::Ascending));
    assert_eq!(rows(&view, root), ["c.txt", "b.bin", "a.txt"]);
    view.sort_by(FileSort::new(SortColumn::None, SortOrder::Ascending));
    assert_eq!(rows(&view, root), ["a.txt", "b.bin", "c.txt"]);
    Ok(())
}
