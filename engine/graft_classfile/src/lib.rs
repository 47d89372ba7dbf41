//! # Graft Classfile - Class-File Model and Disassembler
//!
//! A structurally parallel companion to the rewrite engine: no diffing,
//! just a deterministic depth-first rendering of a parsed class-file model
//! to javap-like text. The caller picks a [`DisassemblyMode`] bitmask and a
//! line separator; everything else is a pure function of the model.
//!
//! The crate has three layers:
//! - [`model`]: plain structs for the class file, its members, attributes
//!   and constant pool, with access-flag bit sets
//! - [`descriptor`]: binary descriptor and generic-signature decoding to
//!   Java source type text
//! - [`Disassembler`]: the renderer, gated by mode bits (`SYSTEM` constant
//!   pool dump, `DETAILED` attribute tables, `COMPACT` simple names,
//!   `WORKING_COPY` compilable pseudo-source)

pub mod descriptor;
pub mod model;

mod disassembler;

pub use disassembler::{Disassembler, DisassemblyMode};
