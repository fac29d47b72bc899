/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Login, logout and current user
/// - `users`: User management
/// - `blocks`: Page blocks
/// - `forms`: Forms and submissions
/// - `settings`: Site settings and SEO
/// - `content`: Page sections
/// - `images`, `videos`, `logo`: Uploaded media
/// - `dashboard`: Counts, recent activity and backups

pub mod auth;
pub mod blocks;
pub mod content;
pub mod dashboard;
pub mod forms;
pub mod health;
pub mod images;
pub mod logo;
pub mod media;
pub mod settings;
pub mod users;
pub mod videos;
