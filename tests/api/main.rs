mod helpers;
mod states_list;
