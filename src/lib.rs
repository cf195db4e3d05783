//! Clinical Sim - Simulated patient encounters
//!
//! A learner interviews an AI-played patient built from a clinical case,
//! records examinations and a final diagnosis, and is then scored by an AI
//! tutor on the four RIME competency axes (Reporter, Interpreter, Manager,
//! Educator). A separate tutor flow generates placement quizzes tailored to
//! the learner's profile.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
