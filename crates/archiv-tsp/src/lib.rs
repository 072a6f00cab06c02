//! RFC 3161 Time-Stamp Protocol for archiv
//!
//! This crate builds time-stamp requests, projects DER responses onto the
//! [`archiv_types::TimeStampResponse`] model, and runs the signing pipeline
//! that checks a reply against its request before accepting it.

pub mod client;
pub mod error;
pub mod parse;
pub mod query;
pub mod signature;

pub use client::{
    validate_response, HttpTransport, TimestampClient, TimestampConfig, Transport,
    DEFAULT_TIMEOUT, DFN_TSA_URL, FREETSA_URL,
};
pub use error::{Error, Result};
pub use parse::{
    parse_certificate, parse_message_imprint, parse_response_status, parse_signed_data,
    parse_signer_info, parse_status, parse_timestamp_response, parse_timestamp_response_der,
    parse_tst_info, signed_attrs_for_verification, SignedData,
};
pub use query::{
    create_query, TimeStampReq, TIMESTAMP_QUERY_CONTENT_TYPE, TIMESTAMP_REPLY_CONTENT_TYPE,
};
pub use signature::check_token_signature;
