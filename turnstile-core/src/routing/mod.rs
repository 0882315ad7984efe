//! Forward searches: turn-aware street search for access legs, reverse
//! walking search for egress legs and pruned RAPTOR over the timetable.

pub mod raptor;
pub mod street;
