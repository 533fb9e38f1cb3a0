mod plane_sweep_test;
