use modview_core::config::{ProjectionConfig, DEFAULT_CODEC_CACHE_CAPACITY};
use modview_core::errors::ExErrorKind;
use modview_core::logging_facility::Profile;
use modview_core::schema::{CodecCache, SchemaCodec, SchemaNode};

#[test]
fn test_empty_config_uses_defaults() {
    let config = ProjectionConfig::from_toml_str("").unwrap();
    assert_eq!(config, ProjectionConfig::default());
    assert_eq!(config.codec_cache_capacity, DEFAULT_CODEC_CACHE_CAPACITY);
    assert_eq!(config.log_profile, Profile::Development);
}

#[test]
fn test_full_config() {
    let config = ProjectionConfig::from_toml_str(
        r#"
        log_profile = "production"
        codec_cache_capacity = 8
        "#,
    )
    .unwrap();
    assert_eq!(config.log_profile, Profile::Production);
    assert_eq!(config.codec_cache_capacity, 8);
}

#[test]
fn test_invalid_configs() {
    let cases = [
        "codec_cache_capacity = 0",
        "codec_cache_capacity = \"many\"",
        "log_profile = \"verbose\"",
        "unexpected = true",
    ];
    for text in cases {
        let err = ProjectionConfig::from_toml_str(text).unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidConfig, "config {:?}", text);
    }
}

#[test]
fn test_cache_capacity_flows_into_codec() {
    let config = ProjectionConfig::from_toml_str("codec_cache_capacity = 3").unwrap();
    let root = SchemaCodec::with_config(SchemaNode::container("top", vec![]), &config).unwrap();
    let cache = root.cache().unwrap();
    assert_eq!(cache.capacity(), 3);
    assert!(cache.is_empty());

    assert_eq!(CodecCache::from_config(&config).capacity(), 3);
}
