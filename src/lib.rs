pub mod ai;
pub mod card;
pub mod choice;
pub mod city;
pub mod error;
pub mod event;
pub mod game;
pub mod map;
pub mod player;
