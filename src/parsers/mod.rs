//! Input parsers: the Twig template parser and the form-definition model.

pub mod forms;
pub mod twig;
