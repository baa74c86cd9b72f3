mod pg_message_queue_test;
