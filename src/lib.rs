//! Memory capture gateway: turns photos, notes and voice recordings into
//! structured memory records with a generative model.

// Interdiction stricte de pratiques dangereuses ou non idiomatiques
#![deny(unsafe_code)] // Le code unsafe est interdit
#![deny(missing_docs)] // Toute fonction, struct, enum ou module public doit être documenté
#![deny(non_camel_case_types)]
// Les types doivent suivre la convention CamelCase (exception explicite possible au besoin)

// Options supplémentaires pour ne rien laisser passer
#![deny(unused_must_use)] // Oblige à gérer explicitement les Result et Option
#![deny(non_snake_case)] // Les noms de variables et fonctions doivent être en snake_case
#![deny(non_upper_case_globals)] // Les constantes et globals doivent être en MAJUSCULE
#![deny(nonstandard_style)] // Empêche tout style de code non standard
#![forbid(unsafe_op_in_unsafe_fn)]
// Interdit l'utilisation d'unsafe même dans une fonction unsafe

// Clippy pour stricte discipline
#![deny(clippy::all)] // Active toutes les lints Clippy standard
#![deny(clippy::pedantic)] // Active les lints très strictes de Clippy
#![cfg_attr(not(test), deny(clippy::unwrap_used))] // Interdit unwrap() hors des tests
#![cfg_attr(not(test), deny(clippy::expect_used))] // Interdit expect() hors des tests
#![cfg_attr(not(test), deny(clippy::panic))] // Interdit panic!() hors des tests
#![deny(clippy::print_stdout)] // Interdit println!() en production
#![deny(clippy::todo)] // Interdit les TODO dans le code
#![deny(clippy::unimplemented)] // Interdit les fonctions non implémentées
#![deny(clippy::unwrap_in_result)] // Interdit unwrap() sur Result
#![deny(clippy::module_inception)] // Interdit un module ayant le même nom que le crate
#![deny(clippy::redundant_clone)] // Interdit les clones inutiles
#![deny(clippy::too_many_arguments)] // Limite le nombre d’arguments des fonctions
#![deny(clippy::cognitive_complexity)] // Limite la complexité cognitive des fonctions

// Lints pour sécurité et robustesse
#![deny(overflowing_literals)] // Interdit les littéraux qui débordent

/// Prompting, JSON recovery, coercion and the analysis orchestrator.
pub mod analysis;
/// Capture records, analysis inputs and media helpers.
pub mod capture;
/// Environment-driven configuration.
pub mod config;
/// Gateway error type.
pub mod error;
/// Generative model seam and the Gemini client.
pub mod llm;
/// HTTP server and API routes.
#[allow(clippy::missing_errors_doc)]
pub mod server;
/// Entry helpers to start the gateway.
pub mod start_gateway;
/// Speech-to-text providers and the fallback chain.
pub mod stt;

#[cfg(test)]
mod testing;
