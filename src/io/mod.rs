// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Disk access: guide persistence and screenshot loading.

pub mod media;
pub mod storage;
