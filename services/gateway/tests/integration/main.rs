mod proxy_test;
