//! Decoding and version checks.

use crate::document::{ExportDocument, StoreImage};
use crate::error::{CodecError, CodecResult};
use crate::SUPPORTED_MAJOR_VERSION;
use serde::de::DeserializeOwned;

/// Parses a `major.minor` version tag and returns the major component.
///
/// # Errors
///
/// Returns `ParseError` if the tag is not of the form `<int>[.<int>]`.
pub fn parse_version(tag: &str) -> CodecResult<(u32, u32)> {
    let mut parts = tag.splitn(2, '.');
    let major = parts
        .next()
        .and_then(|p| p.trim().parse::<u32>().ok())
        .ok_or_else(|| CodecError::parse_error(format!("malformed version tag {tag:?}")))?;
    let minor = match parts.next() {
        Some(p) => p
            .trim()
            .parse::<u32>()
            .map_err(|_| CodecError::parse_error(format!("malformed version tag {tag:?}")))?,
        None => 0,
    };
    Ok((major, minor))
}

fn check_version(tag: &str) -> CodecResult<()> {
    let (major, _) = parse_version(tag)?;
    if major != SUPPORTED_MAJOR_VERSION {
        return Err(CodecError::unsupported_version(tag));
    }
    Ok(())
}

/// Decodes an export document.
///
/// The whole input is decoded before anything is returned, so callers can
/// treat the result as a staging copy.
///
/// # Errors
///
/// - `ParseError` if the input is not a well-formed export document
/// - `UnsupportedFormatVersion` if the major version is not supported
pub fn decode_document<E: DeserializeOwned>(bytes: &[u8]) -> CodecResult<ExportDocument<E>> {
    let document: ExportDocument<E> =
        serde_json::from_slice(bytes).map_err(|e| CodecError::parse_error(e.to_string()))?;
    check_version(&document.version)?;
    Ok(document)
}

/// Decodes a store image.
///
/// # Errors
///
/// Same as [`decode_document`].
pub fn decode_image<E: DeserializeOwned>(bytes: &[u8]) -> CodecResult<StoreImage<E>> {
    let image: StoreImage<E> =
        serde_json::from_slice(bytes).map_err(|e| CodecError::parse_error(e.to_string()))?;
    check_version(&image.version)?;
    Ok(image)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::encoder::{encode_document, encode_image};
    use crate::{BackupMetadata, BackupSummary, FORMAT_VERSION};
    use chrono::{TimeZone, Utc};
    use indexmap::IndexMap;
    use proptest::prelude::*;
    use serde_json::{json, Value};

    fn sample_document() -> ExportDocument<Value> {
        let mut doc = ExportDocument::new();
        doc.insert_collection(
            "clients",
            vec![
                json!({"id": 1, "name": "Bar El Rincón", "createdAt": "2024-03-01T10:00:00Z"}),
                json!({"id": 2, "name": "Cafetería Central", "eveningOpenTime": ""}),
            ],
        );
        doc.insert_collection("machines", vec![]);
        doc.backups_metadata.push(BackupSummary {
            id: "backup_1709287200000".into(),
            metadata: BackupMetadata {
                timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
                size: 512,
                version: FORMAT_VERSION.into(),
            },
            created_at: Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap(),
        });
        doc
    }

    #[test]
    fn document_roundtrip() {
        let doc = sample_document();
        let bytes = encode_document(&doc).unwrap();
        let decoded: ExportDocument<Value> = decode_document(&bytes).unwrap();
        assert_eq!(doc, decoded);
    }

    #[test]
    fn document_layout_is_flat() {
        let bytes = encode_document(&sample_document()).unwrap();
        let raw: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(raw["version"], "1.0");
        assert!(raw["clients"].is_array());
        assert_eq!(raw["backupsMetadata"][0]["id"], "backup_1709287200000");
        assert_eq!(raw["backupsMetadata"][0]["metadata"]["size"], 512);
        assert!(raw["backupsMetadata"][0].get("data").is_none());
    }

    #[test]
    fn backups_metadata_is_not_a_collection() {
        let doc: ExportDocument<Value> =
            decode_document(&encode_document(&sample_document()).unwrap()).unwrap();
        assert!(doc.collection("backupsMetadata").is_none());
        assert!(doc.collection("version").is_none());
        assert_eq!(doc.collections.len(), 2);
    }

    #[test]
    fn missing_version_reads_as_legacy() {
        let bytes = br#"{"clients": [{"id": 1}], "backupsMetadata": []}"#;
        let doc: ExportDocument<Value> = decode_document(bytes).unwrap();
        assert_eq!(doc.version, FORMAT_VERSION);
        assert_eq!(doc.entity_count(), 1);
    }

    #[test]
    fn newer_minor_version_accepted() {
        let bytes = br#"{"version": "1.7", "clients": []}"#;
        assert!(decode_document::<Value>(bytes).is_ok());
    }

    #[test]
    fn unknown_major_version_rejected() {
        let bytes = br#"{"version": "2.0", "clients": []}"#;
        let err = decode_document::<Value>(bytes).unwrap_err();
        assert_eq!(err, CodecError::unsupported_version("2.0"));
    }

    #[test]
    fn malformed_version_is_parse_error() {
        let bytes = br#"{"version": "one", "clients": []}"#;
        let err = decode_document::<Value>(bytes).unwrap_err();
        assert!(matches!(err, CodecError::ParseError { .. }));
    }

    #[test]
    fn malformed_json_is_parse_error() {
        let err = decode_document::<Value>(b"{\"clients\": [").unwrap_err();
        assert!(matches!(err, CodecError::ParseError { .. }));
    }

    #[test]
    fn non_array_collection_is_parse_error() {
        let err = decode_document::<Value>(br#"{"clients": {"id": 1}}"#).unwrap_err();
        assert!(matches!(err, CodecError::ParseError { .. }));
    }

    #[test]
    fn image_roundtrip_keeps_backups() {
        let mut collections = IndexMap::new();
        collections.insert(
            "backups".to_string(),
            vec![json!({"id": "backup_1", "data": "{\"version\":\"1.0\"}"})],
        );
        let image = StoreImage::new(collections);

        let bytes = encode_image(&image).unwrap();
        let decoded: StoreImage<Value> = decode_image(&bytes).unwrap();
        assert_eq!(image, decoded);
    }

    #[test]
    fn parse_version_parts() {
        assert_eq!(parse_version("1.0").unwrap(), (1, 0));
        assert_eq!(parse_version("3").unwrap(), (3, 0));
        assert!(parse_version("").is_err());
        assert!(parse_version("1.x").is_err());
    }

    fn attribute_strategy() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| json!(n)),
            "[a-zA-Z0-9 áéíóúñ:]{0,16}".prop_map(Value::String),
        ]
    }

    proptest! {
        #[test]
        fn entity_attributes_survive_roundtrip(
            attrs in prop::collection::btree_map("[a-z][a-zA-Z]{0,8}", attribute_strategy(), 0..8),
            id in 1i64..10_000,
        ) {
            let mut entity = serde_json::Map::new();
            entity.insert("id".into(), json!(id));
            for (k, v) in attrs {
                entity.insert(k, v);
            }
            let mut doc: ExportDocument<Value> = ExportDocument::new();
            doc.insert_collection("clients", vec![Value::Object(entity)]);

            let decoded: ExportDocument<Value> =
                decode_document(&encode_document(&doc).unwrap()).unwrap();
            prop_assert_eq!(doc, decoded);
        }
    }
}
