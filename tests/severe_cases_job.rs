// tests/severe_cases_job.rs
mod common;

use chrono::{NaiveDate, TimeZone};
use common::ScriptedFetcher;
use health_release_notifier::config::NotifierConfig;
use health_release_notifier::jobs::{jst, severe_cases, JobContext};
use health_release_notifier::notify::MemoryNotifier;
use health_release_notifier::poll::{FetchResult, FreshnessPredicate, PollTarget, Poller, Verdict};
use health_release_notifier::sources::severe_cases::AggregateRowPredicate;

const FEED_URL: &str = "https://example.test/severe_cases_daily.csv";

const FEED_3_DAYS: &str = "Date,Prefecture,Severe cases\n\
    2021/1/1,ALL,50\n\
    2021/1/1,Tokyo,10\n\
    2021/1/2,ALL,55\n\
    2021/1/2,Tokyo,11\n\
    2021/1/3,ALL,53\n";

const FEED_2_DAYS: &str = "Date,Prefecture,Severe cases\n\
    2021/1/1,ALL,50\n\
    2021/1/2,ALL,55\n";

fn ctx_at(y: i32, m: u32, d: u32, h: u32) -> JobContext {
    let mut cfg = NotifierConfig::default();
    cfg.sources.severe_cases_url = FEED_URL.to_string();
    let now = jst().with_ymd_and_hms(y, m, d, h, 0, 0).unwrap();
    JobContext::new(cfg).with_now(now)
}

#[tokio::test(start_paused = true)]
async fn present_date_is_ready_on_first_attempt() {
    let fetcher = ScriptedFetcher::new().route(FEED_URL, 200, FEED_3_DAYS);
    let target = PollTarget::date_row(FEED_URL, NaiveDate::from_ymd_opt(2021, 1, 2).unwrap());

    let out = Poller::default()
        .poll(target, &fetcher, &AggregateRowPredicate::default())
        .await
        .unwrap();

    assert_eq!(out.payload.count, 55);
    assert_eq!(out.attempts, 1);
    assert_eq!(fetcher.requests().len(), 1);
}

#[tokio::test(start_paused = true)]
async fn job_mails_counts_and_delta() {
    let fetcher = ScriptedFetcher::new().route(FEED_URL, 200, FEED_3_DAYS);
    let notifier = MemoryNotifier::new();
    // "today" is 2021-01-03 in JST, so the pair is 01-01 / 01-02
    let ctx = ctx_at(2021, 1, 3, 9);

    let report = severe_cases::run(&ctx, &fetcher, &notifier).await.unwrap();

    assert_eq!(report.previous.count, 50);
    assert_eq!(report.current.count, 55);
    assert_eq!(report.delta.to_string(), "+5");

    let sent = notifier.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].text.contains("日付: 2021-01-02  重症者数: 55  前日比: +5"));
}

#[tokio::test(start_paused = true)]
async fn job_waits_until_yesterday_is_published() {
    // yesterday (01-03) shows up on the third fetch of the feed
    let fetcher = ScriptedFetcher::new()
        .route(FEED_URL, 200, FEED_2_DAYS)
        .route(FEED_URL, 200, FEED_2_DAYS)
        .route(FEED_URL, 200, FEED_2_DAYS)
        .route(FEED_URL, 200, FEED_3_DAYS);
    let notifier = MemoryNotifier::new();
    let ctx = ctx_at(2021, 1, 4, 9);

    let report = severe_cases::run(&ctx, &fetcher, &notifier).await.unwrap();

    // previous day (01-02) ready on fetch 1; yesterday NotReady on 2 and 3, ready on 4
    assert_eq!(fetcher.requests().len(), 4);
    assert_eq!(report.attempts, 4);
    assert_eq!(report.current.count, 53);
    assert_eq!(report.delta.change(), -2);
}

#[tokio::test(start_paused = true)]
async fn deadline_stops_job_without_mail() {
    let fetcher = ScriptedFetcher::new().route(FEED_URL, 200, FEED_2_DAYS);
    let notifier = MemoryNotifier::new();
    let mut ctx = ctx_at(2021, 1, 9, 9);
    ctx.config.poll.deadline_secs = Some(60);

    let err = severe_cases::run(&ctx, &fetcher, &notifier).await.unwrap_err();

    assert!(format!("{err:#}").contains("deadline"));
    assert!(notifier.sent().is_empty());
}

#[test]
fn predicate_on_sample_feed() {
    let target = PollTarget::date_row(FEED_URL, NaiveDate::from_ymd_opt(2021, 1, 4).unwrap());
    let fetched = FetchResult::new(FEED_URL, 200, FEED_3_DAYS.as_bytes().to_vec());
    assert_eq!(
        AggregateRowPredicate::default().evaluate(&target, &fetched),
        Verdict::NotReady
    );
}
