mod submit_email;
