// SPDX-FileCopyrightText: 2026 Sigstat Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Interactive statistics dashboard.
//!
//! [`figures`] turns aggregation outputs into plotly figure JSON; the
//! [`server`] serves those figures and a single HTML page over axum. Every
//! figure request reads messages through the shared
//! [`RefreshCache`](sigstat_store::RefreshCache).

pub mod figures;
pub mod handlers;
pub mod server;

pub use figures::{Figure, FigureKind, build_figure};
pub use server::{DashboardState, ServerConfig, router, serve};
