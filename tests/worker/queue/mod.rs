//! Tests for [`injectd::pool::queue::TaskQueue`] (C2).

use crate::setup::*;

mod is_empty;
mod len;
mod push;
