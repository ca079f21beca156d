// This file is part of hoard.
// Copyright (C) 2025 Hoard Contributors
// SPDX-License-Identifier: Apache-2.0
// Licensed under the Apache License, Version 2.0 (the "License");
// You may not use this file except in compliance with the License.
// You may obtain a copy of the License at
// http://www.apache.org/licenses/LICENSE-2.0
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Exemplar value types.
//!
//! These are real, usable types, and also the reference implementations of
//! the [`crate::TypeDescriptor`] contract: [`string`] and [`data`] show the
//! two binary-leaf protocols, [`array`] shows structured containers in both
//! mutability flavors, and [`key_value`]/[`dictionary`] show multi-group
//! walkers and the comparator fallback. All of them are recognized by
//! [`crate::core_resolver`].

pub mod array;
pub mod data;
pub mod dictionary;
pub mod key_value;
pub mod string;
