use bgp_packet::{BgpPacket, BgpParseError};
use hex_literal::hex;

#[test]
fn test_attribute_parse_error_context() {
    // Create invalid BGP Update packet with truncated attribute
    let invalid_update = hex!(
        "ffffffffffffffffffffffffffffffff" // BGP marker
        "001f" // Length: 31 bytes
        "02"   // Type: Update
        "0000" // Withdrawal length: 0
        "0004" // Path attributes length: 4
        "4001" // Attribute flags (well-known, transitive) and type (ORIGIN)
        "02"   // Length: 2 (but only 1 byte follows)
        "00"   // Truncated data
    );

    let result = BgpPacket::parse_packet(&invalid_update, false, None);

    match result {
        Err(BgpParseError::IncompleteData { needed }) => {
            println!(
                "Successfully caught incomplete data error, needed: {} bytes",
                needed
            );
            assert!(needed > 0);
        }
        Err(BgpParseError::AttributeParseError {
            attr_type,
            source: _,
        }) => {
            println!(
                "Successfully caught attribute parse error for: {:?}",
                attr_type
            );
            assert_eq!(attr_type, bgp_packet::AttrType::Origin);
        }
        Err(other_error) => {
            println!("Got different error: {:?}", other_error);
            // This is also acceptable as the error might manifest differently
        }
        Ok(_) => {
            panic!("Expected parse error but got success");
        }
    }
}

#[test]
fn test_attribute_flags_error_reports_offset() {
    // MED (type 4) must carry exactly the Optional flag (0x80); this one
    // is flagged Optional|Transitive (0xc0), which §4.A/§8 say must be
    // rejected with an AttribFlagsError pinned to the attribute's start.
    let bad_med = hex!(
        "ffffffffffffffffffffffffffffffff" // BGP marker
        "001e" // Length: 30 bytes
        "02"   // Type: Update
        "0000" // Withdrawal length: 0
        "0007" // Path attributes length: 7
        "c0"   // Attribute flags: OPTIONAL|TRANSITIVE (wrong for MED)
        "04"   // Type: MED
        "04"   // Length: 4
        "00000000"
    );

    match BgpPacket::parse_packet(&bad_med, false, None) {
        Err(BgpParseError::AttribFlagsError {
            attr_type,
            offset,
            length,
        }) => {
            assert_eq!(attr_type, 4);
            assert_eq!(offset, 0);
            assert_eq!(length, 7);
        }
        other => panic!("expected AttribFlagsError, got {:?}", other),
    }
}

#[test]
fn test_unrecognized_well_known_attribute_is_rejected() {
    // Type 200 is outside the well-known range this decoder recognizes;
    // with the Optional bit clear it must be treated as an unrecognized
    // well-known attribute, not silently preserved.
    let unknown_well_known = hex!(
        "ffffffffffffffffffffffffffffffff"
        "0016" // Length: 22 bytes
        "02"
        "0000"
        "0003"
        "40"   // Attribute flags: TRANSITIVE only (Optional clear)
        "c8"   // Type: 200
        "00"   // Length: 0
    );

    match BgpPacket::parse_packet(&unknown_well_known, false, None) {
        Err(BgpParseError::UnrecognizedWellKnownAttrib { attr_type }) => {
            assert_eq!(attr_type, 200);
        }
        other => panic!("expected UnrecognizedWellKnownAttrib, got {:?}", other),
    }
}

#[test]
fn test_error_display() {
    use bgp_packet::AttrType;

    let error = BgpParseError::AttributeParseError {
        attr_type: AttrType::Origin,
        source: Box::new(BgpParseError::NomError("test error".to_string())),
    };

    let error_string = format!("{}", error);
    assert!(error_string.contains("Origin"));
    assert!(error_string.contains("Failed to parse BGP attribute"));
    println!("Error display: {}", error_string);
}
