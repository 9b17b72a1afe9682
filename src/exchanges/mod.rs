pub mod ftx;
