pub mod inter_arrival;
