mod helpers;
mod identity_header_test;
mod otp_test;
