/*
 * Responsibility
 * - middleware の公開インターフェース
 * - auth::access: bearer admission on protected routes
 * - rate_headers: per-request scope + rate/telemetry headers on every response
 */
pub mod auth;
pub mod cors;
pub mod http;
pub mod rate_headers;
