// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! # Meridian Components
//!
//! Obtaining a local, pinned handle to a component addressed by a global id.
//!
//! A [`ComponentHandle`] is produced by a [`ComponentContext`] after the id
//! has been resolved, checked to live on the calling locality, checked for
//! type compatibility and pinned. Dropping the handle runs exactly one
//! [`Release`], whose discipline was chosen at acquisition time:
//!
//! - the ordinary release drops the held id (returning its credit) and then
//!   unpins;
//! - the migration-aware release unpins first and, if the instance was
//!   relocated while pinned, reclaims the orphaned local storage through the
//!   [`DeleterRegistry`] before dropping the id.

#![warn(missing_docs)]

mod context;
mod deleter;
mod handle;
mod release;

pub use context::ComponentContext;
pub use deleter::{Deleter, DeleterRegistry};
pub use handle::ComponentHandle;
pub use release::{Release, ReleaseStrategy};
