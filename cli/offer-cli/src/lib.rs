#![forbid(unsafe_code)]

pub mod asset;
pub mod authorize;
pub mod claim;
pub mod common;
pub mod config;
pub mod error;
pub mod input;
pub mod normalize;
pub mod offer;
pub mod pipeline;
pub mod submit;
pub mod tree;
pub mod wallet;

pub use asset::{encode_row, Asset};
pub use authorize::{
    authorize_batch, Authorization, ClockSeed, FixedSeed, SeedSource, Signature, SignatureKind,
    WalletProvider,
};
pub use claim::{compute_claim, encode_claim, Claim};
pub use common::{hex_encode, keccak256, write_file_atomic, Hash256, Keccak};
pub use config::{Environment, Settings};
pub use error::OfferError;
pub use normalize::{parse_integer, Address, ChecksumAddress, Eip55, StrictEip55};
pub use offer::{assemble, Offer};
pub use pipeline::OfferBuilder;
pub use submit::{FileSink, HttpSink, SubmissionSink};
pub use tree::{verify_proof, BatchTree};
pub use wallet::LocalWallet;
