// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

#![deny(clippy::pedantic)]
#![allow(
    clippy::missing_errors_doc,
    clippy::missing_panics_doc,
    clippy::must_use_candidate,
    clippy::module_name_repetitions,
    clippy::items_after_test_module
)]

//! Live bytecode disassembly for a Python source file.
//!
//! The pipeline has three pure stages and a thin layer of glue:
//! [`format`] turns source text into a `dis.dis` command safe to hand to an
//! interpreter, [`parse`] splits the interpreter's transcript into
//! line-addressed blocks, and [`select`] maps editor selections onto the
//! source lines whose blocks should be highlighted. [`model`] classifies
//! backend messages into renderable state, [`kernel`] runs the interpreter,
//! [`render`] draws the result, and [`panel`] ties a watched file to all of
//! the above.

#[macro_use]
extern crate log;

pub mod format;
pub mod kernel;
pub mod model;
pub mod panel;
pub mod parse;
pub mod render;
pub mod select;
