mod function_calling_e2e;
mod providers;
