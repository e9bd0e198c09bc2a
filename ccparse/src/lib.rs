// SPDX-License-Identifier: GPL-3.0-or-later

pub mod args;
pub mod builtin;
pub mod config;
pub mod modes;
pub mod parser;
pub mod properties;
