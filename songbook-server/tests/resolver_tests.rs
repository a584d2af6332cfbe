//! Chord source resolution through the real extractors over scripted network

mod helpers;

use helpers::*;
use songbook_common::notation::parse_sheet;
use songbook_common::ChordLine;
use songbook_server::extractors::{GeneratedChordSource, SongsterrClient, UltimateGuitarClient};
use songbook_server::http::mock::MockTransport;
use songbook_server::services::{ChordSourceResolver, CHORDS_UNAVAILABLE};
use songbook_server::types::{ChordSource, Provenance};
use std::sync::Arc;
use std::time::Duration;

#[tokio::test]
async fn manual_override_wins_without_network() {
    let transport = Arc::new(full_transport());
    let state = test_app_state(transport.clone(), FakeGenerator::answering("[C]gen")).await;
    let requests_after_load = transport.request_count();

    let song = state.catalog.find(AUTOBIOGRAFIA_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::Manual);
    assert_eq!(result.text, "[G]Od ręki");
    assert_eq!(transport.request_count(), requests_after_load);
}

#[tokio::test]
async fn inline_content_is_used_verbatim() {
    let transport = Arc::new(full_transport());
    let generator = FakeGenerator::answering("[C]gen");
    let state = test_app_state(transport.clone(), generator.clone()).await;

    let song = state.catalog.find(WHISKY_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::ManualLegacy);
    assert_eq!(result.text, "[C]Powiedz mi [G]jak, powiedz mi [Am]jak");
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn url_content_tries_songsterr_first() {
    let transport = Arc::new(full_transport());
    let state = test_app_state(transport.clone(), FakeGenerator::answering("[C]gen")).await;

    let song = state.catalog.find(WONDERWALL_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::Songsterr);
    assert_eq!(
        result.text,
        "[Verse 1]\n\
         [Em7]Today is gonna be the day that they're [G]gonna throw it back to you\n\
         [Dsus4]By now you should've somehow [A7sus4]realised what you gotta do\n\
         \n\
         [Chorus]\n\
         And all the [C]roads we have to [D]walk are [Em]winding"
    );

    let urls = transport.urls();
    assert!(urls[1].starts_with(SONGSTERR_SEARCH_PREFIX), "{urls:?}");
    assert_eq!(urls[2], SONGSTERR_CHORDS_URL);
    assert!(!urls.iter().any(|u| u == UG_WONDERWALL_URL));

    let parsed = parse_sheet(&result.text);
    assert_eq!(
        parsed[0],
        ChordLine::SectionHeader {
            label: "Verse 1".to_string()
        }
    );
}

#[tokio::test]
async fn ultimate_guitar_used_when_songsterr_fails() {
    let transport = Arc::new(
        sheet_transport()
            .fail(SONGSTERR_SEARCH_PREFIX, "connection reset")
            .respond(UG_WONDERWALL_URL, 200, UG_TAB_HTML),
    );
    let generator = FakeGenerator::answering("[C]gen");
    let state = test_app_state(transport.clone(), generator.clone()).await;

    let song = state.catalog.find(WONDERWALL_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::UltimateGuitar);
    assert_eq!(
        result.text,
        "[Intro]\n[Em7]  [G]  [Dsus4]  [A7sus4]\n\n[Verse 1]\n[Em7]          [G]\nToday is gonna be the day"
    );
    assert_eq!(generator.call_count(), 0);
}

#[tokio::test]
async fn generated_fallback_gets_source_url() {
    // Nothing but the sheet answers; both sites get 404s
    let transport = Arc::new(sheet_transport());
    let generator = FakeGenerator::answering("[Em7]Today is gonna be the day");
    let state = test_app_state(transport.clone(), generator.clone()).await;

    let song = state.catalog.find(WONDERWALL_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::Generated);
    assert_eq!(result.text, "[Em7]Today is gonna be the day");

    let prompts = generator.prompts();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains(UG_WONDERWALL_URL));
    assert!(prompts[0].contains("\"Wonderwall\""));
}

#[tokio::test]
async fn ultimate_guitar_skipped_without_ug_url() {
    let transport = Arc::new(sheet_transport());
    let state = test_app_state(transport.clone(), FakeGenerator::answering("[D]gen")).await;

    let song = state.catalog.find(NO_BAND_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::Generated);
    assert!(!transport
        .urls()
        .iter()
        .any(|u| u.contains("ultimate-guitar.com")));
}

#[tokio::test]
async fn everything_failing_yields_fixed_message() {
    let transport = Arc::new(sheet_transport());
    let state = test_app_state(transport, FakeGenerator::unconfigured()).await;

    let song = state.catalog.find(WONDERWALL_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::None);
    assert_eq!(result.text, CHORDS_UNAVAILABLE);
    assert!(!result.text.is_empty());
}

#[tokio::test]
async fn slow_site_is_cut_off_by_step_timeout() {
    let transport = Arc::new(
        sheet_transport()
            .respond_after(SONGSTERR_SEARCH_PREFIX, Duration::from_secs(10), 200, SONGSTERR_SEARCH_JSON)
            .respond(UG_WONDERWALL_URL, 200, UG_TAB_HTML),
    );
    let state = test_app_state(transport.clone(), FakeGenerator::answering("[C]gen")).await;
    let song = state.catalog.find(WONDERWALL_ID).await.unwrap();

    let sources: Vec<Arc<dyn ChordSource>> = vec![
        Arc::new(SongsterrClient::new(transport.clone())),
        Arc::new(UltimateGuitarClient::new(transport.clone())),
        Arc::new(GeneratedChordSource::new(FakeGenerator::answering("[C]gen"))),
    ];
    let resolver = ChordSourceResolver::new(sources).with_step_timeout(Duration::from_millis(100));

    let started = std::time::Instant::now();
    let result = resolver.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::UltimateGuitar);
    assert!(started.elapsed() < Duration::from_secs(5));
}

#[tokio::test]
async fn blank_manual_column_falls_through() {
    let csv = "Zespół,Tytuł,YT,Tekst,Embed,Akordy,Akordy2\nOasis,Wonderwall,,,,   ,\n";
    let transport = Arc::new(
        MockTransport::new()
            .respond(SHEETS_PREFIX, 200, csv)
            .respond(SONGSTERR_SEARCH_PREFIX, 200, SONGSTERR_SEARCH_JSON)
            .respond(SONGSTERR_CHORDS_URL, 200, SONGSTERR_CHORDS_HTML),
    );
    let state = test_app_state(transport, FakeGenerator::answering("[C]gen")).await;

    let song = state.catalog.find(WONDERWALL_ID).await.unwrap();
    assert_eq!(song.manual_chords, None);
    assert_eq!(state.chords.resolve(&song).await.provenance, Provenance::Songsterr);
}

#[tokio::test]
async fn ultimate_guitar_link_in_embed_field_is_used() {
    let csv = format!(
        "Zespół,Tytuł,YT,Tekst,Embed,Akordy,Akordy2\n\
         Oasis,Wonderwall,,https://www.songsterr.com/a/wsa/oasis-wonderwall-tab-s269,{},,\n",
        UG_WONDERWALL_URL
    );
    let transport = Arc::new(
        MockTransport::new()
            .respond(SHEETS_PREFIX, 200, csv)
            .respond(UG_WONDERWALL_URL, 200, UG_TAB_HTML),
    );
    let generator = FakeGenerator::answering("[C]gen");
    let state = test_app_state(transport.clone(), generator.clone()).await;

    let song = state.catalog.find(WONDERWALL_ID).await.unwrap();
    let result = state.chords.resolve(&song).await;

    assert_eq!(result.provenance, Provenance::UltimateGuitar);
    assert!(result.text.starts_with("[Intro]"));
    assert!(transport.urls().iter().any(|u| u == UG_WONDERWALL_URL));
    assert_eq!(generator.call_count(), 0);
}
