use super::fake::{FakeRenderer, ItemPage, item_url, test_config};
use crate::crawlers::pipeline::run_pipeline;
use crate::error::{HarvestError, SinkError};
use crate::politeness::Politeness;
use crate::results::ItemRecord;
use crate::sink::{CsvSink, RecordSink};
use std::io;
use std::time::Duration;

/// Keeps records in memory and fails the calls whose index is listed
#[derive(Default)]
struct MemorySink {
    records: Vec<ItemRecord>,
    fail_on: Vec<usize>,
    calls: usize,
}

impl RecordSink for MemorySink {
    fn append(&mut self, record: &ItemRecord) -> Result<(), SinkError> {
        let call = self.calls;
        self.calls += 1;
        if self.fail_on.contains(&call) {
            return Err(SinkError::Io(io::Error::other("disk full")));
        }
        self.records.push(record.clone());
        Ok(())
    }
}

fn urls(sink: &MemorySink) -> Vec<&str> {
    sink.records.iter().map(ItemRecord::source_url).collect()
}

#[tokio::test(start_paused = true)]
async fn test_every_link_gets_one_record_in_order() {
    let mut config = test_config();
    config.target_count = 3;
    let mut renderer = FakeRenderer::new()
        .catalog_page(1, &["/store/a", "/store/b?ref=1"])
        .catalog_page(2, &["/store/b", "/store/c"])
        .good_item(&item_url("/store/a"), "Phone A")
        .item(&item_url("/store/b"), ItemPage::ScriptFails)
        .good_item(&item_url("/store/c"), "Phone C");
    let mut sink = MemorySink::default();
    let mut politeness = Politeness::with_seed(1);

    let report = run_pipeline(&mut renderer, &mut sink, &config, &mut politeness)
        .await
        .unwrap();

    assert_eq!(
        urls(&sink),
        vec![
            "https://shop.test/store/a",
            "https://shop.test/store/b",
            "https://shop.test/store/c"
        ]
    );
    assert_eq!(sink.records[0].name(), "Phone A");
    assert!(sink.records[1].is_fallback());
    assert_eq!(sink.records[2].rating(), "4.8");

    assert_eq!(report.pages_visited, 2);
    assert_eq!(report.links_discovered, 3);
    assert_eq!(report.records_written, 3);
    assert_eq!(report.records_failed, 1);
    assert_eq!(report.sink_errors, 0);
    assert_eq!(report.links_skipped(), 0);
    assert!(!report.deadline_hit);
}

#[tokio::test(start_paused = true)]
async fn test_hanging_item_does_not_stall_the_rest() {
    let mut config = test_config();
    config.target_count = 3;
    let mut renderer = FakeRenderer::new()
        .catalog_page(1, &["/store/a", "/store/b", "/store/c"])
        .good_item(&item_url("/store/a"), "Phone A")
        .item(&item_url("/store/b"), ItemPage::Hang)
        .good_item(&item_url("/store/c"), "Phone C");
    let mut sink = MemorySink::default();
    let mut politeness = Politeness::with_seed(2);

    let report = run_pipeline(&mut renderer, &mut sink, &config, &mut politeness)
        .await
        .unwrap();

    assert_eq!(report.records_written, 3);
    assert_eq!(report.records_failed, 1);
    assert!(sink.records[1].is_fallback());
    assert_eq!(sink.records[2].name(), "Phone C");
    assert!(report.elapsed >= Duration::from_secs(45));
    assert!(report.elapsed < Duration::from_secs(60));
}

#[tokio::test(start_paused = true)]
async fn test_no_links_is_fatal_and_leaves_header_only() {
    let config = test_config();
    let mut renderer = FakeRenderer::new();
    let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
    let mut politeness = Politeness::with_seed(3);

    let err = run_pipeline(&mut renderer, &mut sink, &config, &mut politeness)
        .await
        .unwrap_err();

    assert!(matches!(err, HarvestError::NoLinks { pages: 3 }));
    let written = String::from_utf8(sink.into_inner().unwrap()).unwrap();
    assert_eq!(written, "Name,Description,ImageLink,Price,Rating,Merchant,URL\n");
}

#[tokio::test(start_paused = true)]
async fn test_sink_error_skips_one_row_only() {
    let mut config = test_config();
    config.target_count = 3;
    let mut renderer = FakeRenderer::new()
        .catalog_page(1, &["/store/a", "/store/b", "/store/c"])
        .good_item(&item_url("/store/a"), "Phone A")
        .good_item(&item_url("/store/b"), "Phone B")
        .good_item(&item_url("/store/c"), "Phone C");
    let mut sink = MemorySink {
        fail_on: vec![1],
        ..MemorySink::default()
    };
    let mut politeness = Politeness::with_seed(4);

    let report = run_pipeline(&mut renderer, &mut sink, &config, &mut politeness)
        .await
        .unwrap();

    assert_eq!(
        urls(&sink),
        vec!["https://shop.test/store/a", "https://shop.test/store/c"]
    );
    assert_eq!(report.records_written, 2);
    assert_eq!(report.sink_errors, 1);
    assert_eq!(report.links_skipped(), 0);
}

#[tokio::test(start_paused = true)]
async fn test_run_deadline_stops_item_stage() {
    let mut config = test_config();
    config.target_count = 4;
    config.run_deadline_secs = 100;
    let mut renderer = FakeRenderer::new()
        .catalog_page(1, &["/store/a", "/store/b", "/store/c", "/store/d"])
        .item(&item_url("/store/a"), ItemPage::Hang)
        .item(&item_url("/store/b"), ItemPage::Hang)
        .item(&item_url("/store/c"), ItemPage::Hang)
        .item(&item_url("/store/d"), ItemPage::Hang);
    let mut sink = MemorySink::default();
    let mut politeness = Politeness::with_seed(5);

    let report = run_pipeline(&mut renderer, &mut sink, &config, &mut politeness)
        .await
        .unwrap();

    // Two items fit in the budget; the third is cut off mid-flight
    assert_eq!(report.records_written, 2);
    assert_eq!(report.records_failed, 2);
    assert_eq!(report.links_skipped(), 2);
    assert!(report.deadline_hit);
    assert!(report.elapsed >= Duration::from_secs(100));
    assert!(report.elapsed < Duration::from_secs(101));
    assert!(!renderer.navigations.contains(&item_url("/store/d")));
}

#[tokio::test(start_paused = true)]
async fn test_csv_output_matches_records() {
    let mut config = test_config();
    config.target_count = 2;
    let mut renderer = FakeRenderer::new()
        .catalog_page(1, &["/store/a", "/store/b"])
        .good_item(&item_url("/store/a"), "Phone, \"Pro\"")
        .item(&item_url("/store/b"), ItemPage::NavigationFails);
    let mut sink = CsvSink::from_writer(Vec::new()).unwrap();
    let mut politeness = Politeness::with_seed(6);

    run_pipeline(&mut renderer, &mut sink, &config, &mut politeness)
        .await
        .unwrap();

    let written = sink.into_inner().unwrap();
    let mut reader = csv::Reader::from_reader(written.as_slice());
    let rows: Vec<csv::StringRecord> = reader.records().map(Result::unwrap).collect();

    assert_eq!(rows.len(), 2);
    assert_eq!(&rows[0][0], "Phone, \"Pro\"");
    assert_eq!(&rows[0][4], "4.8");
    assert_eq!(&rows[0][6], "https://shop.test/store/a");
    assert_eq!(&rows[1][0], "N/A");
    assert_eq!(&rows[1][4], "0");
    assert_eq!(&rows[1][6], "https://shop.test/store/b");
}
