//! The object-graph wire engine.
//!
//! [`GraphWriter`] flattens a value to primitive codec operations by walking
//! its [`Reflect`](crate::Reflect) surface; [`GraphReader`] reverses the walk
//! to rebuild the value. Both halves share the same classification order
//! (primitive, extension, structural kind, fallback), so a stream produced
//! with one [`Settings`] value reads back under the same settings.
//!
//! Two codec backends exist: [`BinaryEncoder`]/[`BinaryDecoder`] for the
//! compact little-endian form and [`TextEncoder`]/[`TextDecoder`] for the
//! line-oriented human-readable form.

pub mod codec;
mod context;
mod error;
mod extension;
mod fallback;
mod hooks;
mod reader;
mod refs;
mod settings;
mod writer;

pub use codec::{BinaryDecoder, BinaryEncoder, Decode, Encode, TextDecoder, TextEncoder};
pub use context::TraversalContext;
pub use error::{WireError, WireResult};
pub use fallback::{FallbackCodec, SerdeFallback};
pub use hooks::{
    HookAction, MemberSelect, ReadHook, ReadHookAction, SkipDefaultMembers, SkipMembers,
    WriteHook, is_default_member,
};
pub use reader::GraphReader;
pub use refs::{ReadRefTable, WriteRefTable};
pub use settings::{BytesEncoding, DateEncoding, Settings, SizeWidth};
pub use writer::GraphWriter;
