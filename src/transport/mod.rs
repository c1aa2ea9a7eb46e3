pub mod gateway_session;
