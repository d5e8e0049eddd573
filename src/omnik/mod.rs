pub mod inverter; // TCP client for one datalogger
pub mod packet;   // query frame encoding and response decoding
