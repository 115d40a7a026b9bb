use std::sync::Arc;

use chrono::Duration;
use tag_events::{ManualClock, Params};
use utm_builder::{sources, UtmBuilder, UtmError};

fn stepped_builder() -> UtmBuilder {
    let clock = ManualClock::at("2024-05-01T09:00:00Z")
        .unwrap()
        .with_step(Duration::seconds(1));
    UtmBuilder::new(Arc::new(clock))
}

#[test]
fn test_full_form_event_sequence() {
    let mut builder = stepped_builder();
    let mut recorded: Vec<(String, Params)> = Vec::new();
    let mut clipboard = String::new();

    builder.load(&mut recorded);
    builder.input_base_url("https://shop.example/sale?ref=home", &mut recorded);
    builder.select_source("affiliate", &mut recorded).unwrap();
    builder.select_medium("influencer", &mut recorded).unwrap();
    builder.set_campaign("Summer Drop");
    builder.set_term("  ");
    let url = builder.copy(&mut clipboard, &mut recorded).unwrap();
    builder.reset(&mut recorded);

    let names: Vec<&str> = recorded.iter().map(|(n, _)| n.as_str()).collect();
    assert_eq!(
        names,
        vec![
            "utm_builder_loaded",
            "utmgeneration_start",
            "utm_source_selected",
            "utm_medium_selected",
            "utmgeneration_completed",
            "utm_builder_reset",
        ]
    );
    assert_eq!(
        url,
        "https://shop.example/sale?ref=home&utm_source=affiliate&utm_medium=influencer&utm_campaign=summer_drop"
    );

    let completed = &recorded[4].1;
    assert_eq!(completed["utm_source"], "affiliate");
    assert_eq!(completed["utm_medium"], "influencer");
    assert_eq!(completed["utm_campaign"], "Summer Drop");
    assert!(completed["utm_term"].is_null());
    assert_eq!(recorded[0].1["timestamp"], "2024-05-01T09:00:00.000Z");
    assert_eq!(recorded[5].1["timestamp"], "2024-05-01T09:00:03.000Z");
}

#[test]
fn test_every_taxonomy_pair_is_selectable() {
    let mut builder = stepped_builder();
    let mut recorded: Vec<(String, Params)> = Vec::new();
    for source in sources() {
        builder.select_source(source.key, &mut recorded).unwrap();
        for medium in source.mediums {
            assert_eq!(
                builder.select_medium(medium.value, &mut recorded).unwrap().value,
                medium.value
            );
        }
    }
    assert!(matches!(
        builder.select_medium("nope", &mut recorded),
        Err(UtmError::UnknownMedium { .. })
    ));
}

#[test]
fn test_invalid_base_url_blocks_copy() {
    let mut builder = stepped_builder();
    let mut recorded: Vec<(String, Params)> = Vec::new();
    let mut clipboard = String::new();
    builder.input_base_url("mailto:someone@example.com", &mut recorded);
    builder.select_source("email", &mut recorded).unwrap();
    assert!(matches!(
        builder.copy(&mut clipboard, &mut recorded),
        Err(UtmError::InvalidBaseUrl(_))
    ));
    assert!(clipboard.is_empty());
}
