mod common;

mod balance;
