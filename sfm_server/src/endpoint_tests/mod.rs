
mod accounts;
mod webhook;
mod withdrawals;
