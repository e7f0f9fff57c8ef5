//! Проверка аппаратного состояния серверов через ServerView SNMP агент.

pub mod collector;
pub mod config;
pub mod formatter;
pub mod snmp;
